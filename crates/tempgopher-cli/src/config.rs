//! Configuration file management and settings resolution.
//!
//! Values are resolved in this order: command-line flag, environment
//! variable (handled by clap), configuration file, built-in default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, bail};
use serde::Deserialize;
use tracing::warn;

use tempgopher_core::Credentials;
use tempgopher_core::reconcile::{ReconcilerOptions, SuspendScope};
use tempgopher_types::TemperatureUnit;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Server URL, including any path prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Use Fahrenheit for temperature
    #[serde(default)]
    pub fahrenheit: bool,

    /// Refresh period in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Whether an open edit pauses refresh for one device or for all
    #[serde(default)]
    pub suspend_scope: SuspendScope,

    /// Login name; the password is never stored
    #[serde(default)]
    pub username: Option<String>,

    /// Pre-computed Basic authentication token
    #[serde(default)]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

fn default_timeout() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            fahrenheit: false,
            poll_interval_secs: default_poll_interval(),
            timeout_secs: default_timeout(),
            suspend_scope: SuspendScope::default(),
            username: None,
            token: None,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tempgopher")
            .join("config.toml")
    }

    /// Load config from the default location, or return default if not found
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from `path`. Unreadable or invalid files yield the
    /// defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to parse config");
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read config");
                }
            }
        }
        Self::default()
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    /// `Some(true)` for `--fahrenheit`, `Some(false)` for `--celsius`
    pub fahrenheit: Option<bool>,
    pub poll_interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub suspend_scope: Option<SuspendScope>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub credentials: Option<Credentials>,
    pub unit: TemperatureUnit,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub suspend_scope: SuspendScope,
}

impl Settings {
    /// Engine options derived from these settings.
    pub fn reconciler_options(&self) -> ReconcilerOptions {
        ReconcilerOptions {
            unit: self.unit,
            poll_interval: self.poll_interval,
            suspend_scope: self.suspend_scope,
        }
    }
}

/// Merge overrides with the configuration file.
pub fn resolve_settings(overrides: &Overrides, config: &Config) -> Result<Settings> {
    let poll_interval_secs = overrides
        .poll_interval_secs
        .unwrap_or(config.poll_interval_secs);
    if poll_interval_secs == 0 {
        bail!("Poll interval must be at least 1 second");
    }
    let timeout_secs = overrides.timeout_secs.unwrap_or(config.timeout_secs);
    if timeout_secs == 0 {
        bail!("Timeout must be at least 1 second");
    }

    Ok(Settings {
        base_url: overrides
            .url
            .clone()
            .unwrap_or_else(|| config.base_url.clone()),
        credentials: resolve_credentials(overrides, config)?,
        unit: TemperatureUnit::from_fahrenheit_flag(
            overrides.fahrenheit.unwrap_or(config.fahrenheit),
        ),
        poll_interval: Duration::from_secs(poll_interval_secs),
        timeout: Duration::from_secs(timeout_secs),
        suspend_scope: overrides.suspend_scope.unwrap_or(config.suspend_scope),
    })
}

/// Pick credentials: explicit token, then user/password, then the
/// configured token. No credentials is valid for open servers.
pub fn resolve_credentials(overrides: &Overrides, config: &Config) -> Result<Option<Credentials>> {
    if let Some(token) = &overrides.token {
        return Ok(Some(Credentials::from_token(token.clone())));
    }

    let user = overrides.user.as_ref().or(config.username.as_ref());
    match (user, &overrides.password) {
        (Some(user), Some(password)) => Ok(Some(Credentials::from_login(user, password))),
        (None, Some(_)) => bail!("--password requires --user (or username in the config file)"),
        (Some(_), None) if overrides.user.is_some() => {
            bail!("--user requires --password (or TEMPGOPHER_PASSWORD)")
        }
        _ => Ok(config.token.clone().map(Credentials::from_token)),
    }
}
