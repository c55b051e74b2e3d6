//! Temperature unit conversion.
//!
//! The wire format is always Celsius. Values are converted to the display
//! unit only when shown, and back to Celsius only when submitted.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unit used to display temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Map the `fahrenheit` display flag onto a unit.
    #[must_use]
    pub fn from_fahrenheit_flag(fahrenheit: bool) -> Self {
        if fahrenheit {
            Self::Fahrenheit
        } else {
            Self::Celsius
        }
    }

    /// Whether this unit is Fahrenheit.
    #[must_use]
    pub fn is_fahrenheit(self) -> bool {
        matches!(self, Self::Fahrenheit)
    }

    /// Unit suffix for display.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Convert a Celsius value into the display unit.
#[must_use]
pub fn to_display(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 1.8 + 32.0,
    }
}

/// Convert a value in the display unit back to Celsius.
#[must_use]
pub fn to_celsius(value: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => value,
        TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
    }
}

/// Format a Celsius value in the display unit with one decimal place.
///
/// ```
/// use tempgopher_types::units::{TemperatureUnit, format_temperature};
///
/// assert_eq!(format_temperature(21.0, TemperatureUnit::Celsius), "21.0°C");
/// assert_eq!(format_temperature(21.0, TemperatureUnit::Fahrenheit), "69.8°F");
/// ```
#[must_use]
pub fn format_temperature(celsius: f64, unit: TemperatureUnit) -> String {
    format!("{:.1}{}", to_display(celsius, unit), unit.symbol())
}
