//! Wire types for TempGopher thermostats.
//!
//! This crate provides the data shared by the dashboard's core library and
//! its front-ends: status and configuration records as served by the
//! thermostat HTTP API, and the Celsius/Fahrenheit conversion used for
//! display.
//!
//! # Example
//!
//! ```
//! use tempgopher_types::{DeviceStatus, TemperatureUnit, units};
//!
//! let status = DeviceStatus::new("fermenter", 20.0, false, true);
//! assert_eq!(status.hvac_state().label(), "Cooling");
//! assert_eq!(units::format_temperature(status.temperature, TemperatureUnit::Fahrenheit), "68.0°F");
//! ```

pub mod error;
pub mod types;
pub mod units;

pub use error::{ParseError, ParseResult};
pub use types::{DeviceStatus, HvacState, SensorConfig, StatusMap, VersionInfo};
pub use units::TemperatureUnit;
