//! Command-line interface and terminal dashboard for TempGopher thermostats.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dashboard` | Interactive terminal dashboard (default) |
//! | `status` | Print every device once, as text or JSON |
//! | `version` | Print the server version banner |
//! | `set` | Change a device's thresholds or enable flags |
//!
//! # Configuration
//!
//! The CLI reads `~/.config/tempgopher/config.toml` (or platform equivalent):
//!
//! - `base_url`: Server URL including any path prefix
//! - `fahrenheit`: Use Fahrenheit for temperature display
//! - `poll_interval_secs`: Refresh period
//! - `timeout_secs`: Request timeout
//! - `suspend_scope`: `device` or `global`
//! - `username` / `token`: Stored login; passwords are never written
//!
//! # Environment Variables
//!
//! - `TEMPGOPHER_URL`, `TEMPGOPHER_USER`, `TEMPGOPHER_PASSWORD`, `TEMPGOPHER_TOKEN`
//! - `RUST_LOG`: Log filter (the dashboard logs to a file in the cache directory)
//!
//! # Examples
//!
//! ```bash
//! tempgopher --url http://pi.local/thermostat --fahrenheit
//! tempgopher status --format json
//! tempgopher set fermenter --high 68 --cool on
//! ```

pub mod config;
pub mod session;

// Re-export core dependencies for convenience
pub use tempgopher_core;
pub use tempgopher_types;

#[cfg(feature = "tui")]
pub mod tui;
