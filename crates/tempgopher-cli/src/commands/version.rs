//! Version command implementation.

use anyhow::Result;

use tempgopher_cli::config::Settings;
use tempgopher_cli::session;

pub async fn cmd_version(settings: &Settings) -> Result<()> {
    let (_, version) = session::open(settings).await?;
    println!("{}", version.banner());
    Ok(())
}
