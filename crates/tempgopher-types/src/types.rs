//! Core types for thermostat status and configuration.

use std::collections::HashMap;

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Live state of one thermostat as reported by `GET /api/status/`.
///
/// Replaced wholesale on every successful status poll.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceStatus {
    /// Unique, human-readable device name.
    pub alias: String,
    /// Current temperature in degrees Celsius.
    #[cfg_attr(feature = "serde", serde(rename = "temp", with = "wire_temperature"))]
    pub temperature: f64,
    /// Whether the heating output is active.
    #[cfg_attr(feature = "serde", serde(default))]
    pub heating: bool,
    /// Whether the cooling output is active.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooling: bool,
}

impl DeviceStatus {
    /// Create a status record.
    pub fn new(alias: impl Into<String>, temperature: f64, heating: bool, cooling: bool) -> Self {
        Self {
            alias: alias.into(),
            temperature,
            heating,
            cooling,
        }
    }

    /// Derive the displayed state.
    ///
    /// Heating is checked first, so a (normally impossible) record with both
    /// flags set reports [`HvacState::Heating`].
    #[must_use]
    pub fn hvac_state(&self) -> HvacState {
        if self.heating {
            HvacState::Heating
        } else if self.cooling {
            HvacState::Cooling
        } else {
            HvacState::Idle
        }
    }

    /// Whether the record honours the "never heating and cooling" invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        !(self.heating && self.cooling)
    }
}

/// What a thermostat's outputs are doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HvacState {
    Heating,
    Cooling,
    Idle,
}

impl HvacState {
    /// Label shown next to the temperature.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Heating => "Heating",
            Self::Cooling => "Cooling",
            Self::Idle => "Idle",
        }
    }
}

impl fmt::Display for HvacState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-sensor configuration as served by `GET /api/config/sensors/{alias}`.
///
/// The server has no partial-update semantics: a submission must carry the
/// whole record, including the hardware wiring fields the dashboard never
/// edits (`heat_gpio`, `heat_invert`, `cool_gpio`, `cool_invert`, `verbose`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: String,
    pub alias: String,
    /// Cooling threshold in Celsius.
    #[cfg_attr(feature = "serde", serde(rename = "hightemp"))]
    pub high_temp: f64,
    /// Heating threshold in Celsius.
    #[cfg_attr(feature = "serde", serde(rename = "lowtemp"))]
    pub low_temp: f64,
    #[cfg_attr(feature = "serde", serde(rename = "heatgpio", default))]
    pub heat_gpio: i32,
    #[cfg_attr(feature = "serde", serde(rename = "heatinvert", default))]
    pub heat_invert: bool,
    #[cfg_attr(feature = "serde", serde(rename = "heatminutes", default))]
    pub heat_minutes: f64,
    #[cfg_attr(feature = "serde", serde(rename = "heatdisable", default))]
    pub heat_disable: bool,
    #[cfg_attr(feature = "serde", serde(rename = "coolgpio", default))]
    pub cool_gpio: i32,
    #[cfg_attr(feature = "serde", serde(rename = "coolinvert", default))]
    pub cool_invert: bool,
    #[cfg_attr(feature = "serde", serde(rename = "coolminutes", default))]
    pub cool_minutes: f64,
    #[cfg_attr(feature = "serde", serde(rename = "cooldisable", default))]
    pub cool_disable: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub verbose: bool,
}

/// Response of `GET /api/version`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VersionInfo {
    pub version: String,
}

impl VersionInfo {
    /// Footer text shown by the dashboard.
    #[must_use]
    pub fn banner(&self) -> String {
        format!("TempGopher | Version: {}", self.version)
    }
}

/// Status records keyed by alias, in server order.
pub type StatusMap = HashMap<String, DeviceStatus>;

/// Parse a temperature sent as a string.
///
/// ```
/// use tempgopher_types::types::parse_temperature;
///
/// assert_eq!(parse_temperature(" 21.5 ").unwrap(), 21.5);
/// assert!(parse_temperature("warm").is_err());
/// ```
pub fn parse_temperature(raw: &str) -> ParseResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidTemperature(raw.to_string()))
}

#[cfg(feature = "serde")]
mod wire_temperature {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(value),
            Raw::Text(text) => super::parse_temperature(&text).map_err(serde::de::Error::custom),
        }
    }

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(*value)
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_status_accepts_numeric_temp() {
        let json = r#"{"alias":"garage","temp":18.25,"heating":true,"cooling":false}"#;
        let status: DeviceStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.alias, "garage");
        assert_eq!(status.temperature, 18.25);
        assert!(status.heating);
        assert!(!status.cooling);
    }

    #[test]
    fn test_status_accepts_string_temp_and_ignores_timestamps() {
        let json = r#"{
            "alias": "fermenter",
            "temp": "19.5",
            "heating": false,
            "cooling": true,
            "reading": "2018-04-01T12:00:00Z",
            "changed": "2018-04-01T11:00:00Z"
        }"#;
        let status: DeviceStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.temperature, 19.5);
        assert_eq!(status.hvac_state(), HvacState::Cooling);
    }

    #[test]
    fn test_status_rejects_non_numeric_temp() {
        let json = r#"{"alias":"x","temp":"hot","heating":false,"cooling":false}"#;
        assert!(serde_json::from_str::<DeviceStatus>(json).is_err());
    }

    #[test]
    fn test_hvac_state_precedence() {
        assert_eq!(DeviceStatus::new("a", 20.0, false, false).hvac_state().label(), "Idle");
        assert_eq!(DeviceStatus::new("a", 20.0, true, false).hvac_state().label(), "Heating");
        assert_eq!(DeviceStatus::new("a", 20.0, false, true).hvac_state().label(), "Cooling");

        let both = DeviceStatus::new("a", 20.0, true, true);
        assert_eq!(both.hvac_state(), HvacState::Heating);
        assert!(!both.is_consistent());
    }

    #[test]
    fn test_sensor_config_wire_names() {
        let json = r#"{
            "id": "28-000008e0ecd5",
            "alias": "fermenter",
            "hightemp": 20.0,
            "lowtemp": 18.0,
            "heatgpio": 5,
            "heatinvert": true,
            "heatminutes": 1,
            "heatdisable": false,
            "coolgpio": 17,
            "coolinvert": false,
            "coolminutes": 10,
            "cooldisable": true,
            "verbose": true
        }"#;
        let config: SensorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.id, "28-000008e0ecd5");
        assert_eq!(config.heat_gpio, 5);
        assert!(config.heat_invert);
        assert_eq!(config.cool_gpio, 17);
        assert!(config.cool_disable);
        assert!(config.verbose);

        let echoed = serde_json::to_value(&config).unwrap();
        assert_eq!(echoed["heatinvert"], true);
        assert_eq!(echoed["coolgpio"], 17);
        assert_eq!(echoed["hightemp"], 20.0);
        assert!(echoed.get("high_temp").is_none());
    }

    #[test]
    fn test_version_banner() {
        let version: VersionInfo = serde_json::from_str(r#"{"version":"1.2.0"}"#).unwrap();
        assert_eq!(version.banner(), "TempGopher | Version: 1.2.0");
    }
}
