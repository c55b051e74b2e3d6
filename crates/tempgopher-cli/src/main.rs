use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tempgopher_cli::config::{Config, resolve_settings};

mod cli;
mod commands;
mod util;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "tui")]
    let dashboard = matches!(cli.command, None | Some(Commands::Dashboard));
    #[cfg(not(feature = "tui"))]
    let dashboard = false;

    init_tracing(&cli, dashboard);

    let config = Config::load();
    let settings = resolve_settings(&cli.connection.to_overrides(), &config)?;

    match cli.command {
        Some(Commands::Status { format, output }) => {
            commands::cmd_status(&settings, format, output.as_ref()).await?;
        }
        Some(Commands::Version) => {
            commands::cmd_version(&settings).await?;
        }
        Some(Commands::Set(args)) => {
            commands::cmd_set(&settings, &args, cli.quiet).await?;
        }
        #[cfg(feature = "tui")]
        None | Some(Commands::Dashboard) => {
            tempgopher_cli::tui::run(&settings)
                .await
                .context("Dashboard failed")?;
        }
        #[cfg(not(feature = "tui"))]
        None => {
            anyhow::bail!("Built without the dashboard; use the status, version or set commands");
        }
    }

    Ok(())
}

/// Initialize tracing.
///
/// One-shot commands log to stderr. The dashboard owns the terminal, so it
/// logs to a file in the cache directory instead.
fn init_tracing(cli: &Cli, dashboard: bool) {
    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if dashboard {
        match open_log_file() {
            Some(file) => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init(),
            None => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .init(),
        }
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

fn log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tempgopher")
        .join("dashboard.log")
}

fn open_log_file() -> Option<File> {
    let path = log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    File::options().create(true).append(true).open(path).ok()
}
