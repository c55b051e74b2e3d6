//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use tempgopher_core::SuspendScope;

use tempgopher_cli::config::Overrides;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// How an open edit suspends automatic refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    /// Only the edited device stops refreshing
    Device,
    /// All refresh stops until every edit is closed
    Global,
}

impl From<ScopeArg> for SuspendScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Device => SuspendScope::Device,
            ScopeArg::Global => SuspendScope::Global,
        }
    }
}

/// Reusable server connection arguments
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Server URL including any path prefix, e.g. http://pi.local/thermostat
    #[arg(long, global = true, env = "TEMPGOPHER_URL")]
    pub url: Option<String>,

    /// Login name for HTTP Basic authentication
    #[arg(short = 'U', long, global = true, env = "TEMPGOPHER_USER")]
    pub user: Option<String>,

    /// Password for HTTP Basic authentication
    #[arg(
        short = 'P',
        long,
        global = true,
        env = "TEMPGOPHER_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Pre-computed Basic authentication token (base64 of user:password)
    #[arg(long, global = true, env = "TEMPGOPHER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Use Fahrenheit for temperature display (overrides --celsius and config)
    #[arg(long, global = true, conflicts_with = "celsius")]
    pub fahrenheit: bool,

    /// Use Celsius for temperature display (default, overrides config)
    #[arg(long, global = true, conflicts_with = "fahrenheit")]
    pub celsius: bool,

    /// Refresh period in seconds
    #[arg(long, global = true)]
    pub poll_interval: Option<u64>,

    /// Request timeout in seconds
    #[arg(short = 'T', long, global = true)]
    pub timeout: Option<u64>,

    /// Whether an open edit pauses refresh for one device or for all
    #[arg(long, global = true, value_enum)]
    pub suspend_scope: Option<ScopeArg>,
}

impl ConnectionArgs {
    /// Resolve fahrenheit setting: explicit flags override config
    pub fn resolve_fahrenheit(&self) -> Option<bool> {
        if self.fahrenheit {
            Some(true)
        } else if self.celsius {
            Some(false)
        } else {
            None
        }
    }

    /// Collect the values that override the configuration file.
    pub fn to_overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            token: self.token.clone(),
            fahrenheit: self.resolve_fahrenheit(),
            poll_interval_secs: self.poll_interval,
            timeout_secs: self.timeout,
            suspend_scope: self.suspend_scope.map(Into::into),
        }
    }
}

#[derive(Parser)]
#[command(name = "tempgopher")]
#[command(author, version, about = "Dashboard for TempGopher thermostats", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Command to run; the dashboard when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print every device's status and thresholds once
    Status {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the server version banner
    Version,

    /// Change a device's thresholds or enable flags
    Set(SetArgs),

    /// Launch interactive terminal dashboard
    #[cfg(feature = "tui")]
    Dashboard,
}

/// Changes for one device; temperatures use the display unit
#[derive(Debug, Clone, Default, Args)]
pub struct SetArgs {
    /// Device alias
    pub alias: String,

    /// Cool when the temperature rises above this value
    #[arg(long, allow_negative_numbers = true)]
    pub high: Option<f64>,

    /// Heat when the temperature falls below this value
    #[arg(long, allow_negative_numbers = true)]
    pub low: Option<f64>,

    /// Minutes the cooling output stays on per cycle
    #[arg(long)]
    pub cool_minutes: Option<f64>,

    /// Minutes the heating output stays on per cycle
    #[arg(long)]
    pub heat_minutes: Option<f64>,

    /// Enable or disable cooling (on/off)
    #[arg(long, value_parser = parse_bool_arg)]
    pub cool: Option<bool>,

    /// Enable or disable heating (on/off)
    #[arg(long, value_parser = parse_bool_arg)]
    pub heat: Option<bool>,
}

/// Parse boolean argument with flexible input
fn parse_bool_arg(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" | "enable" | "enabled" => Ok(true),
        "false" | "no" | "off" | "0" | "disable" | "disabled" => Ok(false),
        _ => Err(format!(
            "Invalid boolean value '{}'. Use: true/false, yes/no, on/off, 1/0",
            s
        )),
    }
}
