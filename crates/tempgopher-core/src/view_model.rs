//! Per-device view model.
//!
//! A [`DeviceViewModel`] joins the latest [`DeviceStatus`] with the last
//! fetched [`SensorConfig`] and, while the user is editing, an
//! [`EditBuffer`] holding the proposed values exactly as typed.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use tempgopher_types::units::{to_celsius, to_display};
use tempgopher_types::{DeviceStatus, SensorConfig, TemperatureUnit};

use crate::error::{Error, Result, ValidationError};

/// Numeric configuration fields the user can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditField {
    /// Cooling threshold, in the display unit.
    HighTemp,
    /// Heating threshold, in the display unit.
    LowTemp,
    /// Minimum cooling run time.
    CoolMinutes,
    /// Minimum heating run time.
    HeatMinutes,
}

impl EditField {
    /// All fields in form order (cooling group first).
    pub const ALL: [EditField; 4] = [
        EditField::CoolMinutes,
        EditField::HighTemp,
        EditField::HeatMinutes,
        EditField::LowTemp,
    ];

    /// Human-readable name used in messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::HighTemp => "high temperature",
            Self::LowTemp => "low temperature",
            Self::CoolMinutes => "cooling minutes",
            Self::HeatMinutes => "heating minutes",
        }
    }

    /// Whether the field holds a temperature (converted at submit time).
    #[must_use]
    pub fn is_temperature(self) -> bool {
        matches!(self, Self::HighTemp | Self::LowTemp)
    }

    /// The output this field belongs to.
    #[must_use]
    pub fn mode(self) -> Mode {
        match self {
            Self::HighTemp | Self::CoolMinutes => Mode::Cool,
            Self::LowTemp | Self::HeatMinutes => Mode::Heat,
        }
    }
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Heating or cooling output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Cool,
    Heat,
}

impl Mode {
    /// Icon used by the dashboard toggles.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Cool => "❄",
            Self::Heat => "🔥",
        }
    }
}

/// Pending, unsaved edits for one device.
///
/// Numeric values are kept as the raw text the user entered, in the display
/// unit; they are parsed and converted to Celsius only when submitted.
/// Fields never passed to [`set_field`](Self::set_field) keep the fetched
/// value exactly, not the rounded text shown for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub high_temp: String,
    pub low_temp: String,
    pub cool_minutes: String,
    pub heat_minutes: String,
    pub cool_enabled: bool,
    pub heat_enabled: bool,
    changed: HashSet<EditField>,
}

impl EditBuffer {
    /// Seed a buffer from the current configuration.
    pub fn from_config(config: &SensorConfig, unit: TemperatureUnit) -> Self {
        Self {
            high_temp: format_field(config, EditField::HighTemp, unit),
            low_temp: format_field(config, EditField::LowTemp, unit),
            cool_minutes: format_field(config, EditField::CoolMinutes, unit),
            heat_minutes: format_field(config, EditField::HeatMinutes, unit),
            cool_enabled: !config.cool_disable,
            heat_enabled: !config.heat_disable,
            changed: HashSet::new(),
        }
    }

    pub fn field(&self, field: EditField) -> &str {
        match field {
            EditField::HighTemp => &self.high_temp,
            EditField::LowTemp => &self.low_temp,
            EditField::CoolMinutes => &self.cool_minutes,
            EditField::HeatMinutes => &self.heat_minutes,
        }
    }

    pub fn set_field(&mut self, field: EditField, value: String) {
        self.changed.insert(field);
        match field {
            EditField::HighTemp => self.high_temp = value,
            EditField::LowTemp => self.low_temp = value,
            EditField::CoolMinutes => self.cool_minutes = value,
            EditField::HeatMinutes => self.heat_minutes = value,
        }
    }

    /// Whether `field` was edited since the buffer was seeded.
    pub fn is_changed(&self, field: EditField) -> bool {
        self.changed.contains(&field)
    }

    pub fn enabled(&self, mode: Mode) -> bool {
        match mode {
            Mode::Cool => self.cool_enabled,
            Mode::Heat => self.heat_enabled,
        }
    }

    pub fn set_enabled(&mut self, mode: Mode, enabled: bool) {
        match mode {
            Mode::Cool => self.cool_enabled = enabled,
            Mode::Heat => self.heat_enabled = enabled,
        }
    }

    fn parse(&self, field: EditField) -> std::result::Result<f64, ValidationError> {
        let input = self.field(field);
        let value = input
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ValidationError::InvalidNumber {
                field,
                input: input.to_string(),
            })?;

        if !field.is_temperature() && value < 0.0 {
            return Err(ValidationError::Negative { field, value });
        }
        Ok(value)
    }

    /// Submitted value of `field`: the parsed input if edited, otherwise the
    /// fetched value untouched.
    fn resolve(
        &self,
        config: &SensorConfig,
        field: EditField,
        unit: TemperatureUnit,
    ) -> std::result::Result<f64, ValidationError> {
        if !self.is_changed(field) {
            return Ok(match field {
                EditField::HighTemp => config.high_temp,
                EditField::LowTemp => config.low_temp,
                EditField::CoolMinutes => config.cool_minutes,
                EditField::HeatMinutes => config.heat_minutes,
            });
        }
        let value = self.parse(field)?;
        Ok(if field.is_temperature() {
            to_celsius(value, unit)
        } else {
            value
        })
    }
}

/// Display text of a configuration field: temperatures in the display unit
/// with one decimal, minutes as stored.
pub fn format_field(config: &SensorConfig, field: EditField, unit: TemperatureUnit) -> String {
    match field {
        EditField::HighTemp => format!("{:.1}", to_display(config.high_temp, unit)),
        EditField::LowTemp => format!("{:.1}", to_display(config.low_temp, unit)),
        EditField::CoolMinutes => config.cool_minutes.to_string(),
        EditField::HeatMinutes => config.heat_minutes.to_string(),
    }
}

/// Snapshot of one device as the dashboard knows it.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceViewModel {
    status: DeviceStatus,
    config: Option<SensorConfig>,
    edit: Option<EditBuffer>,
    config_generation: u64,
}

impl DeviceViewModel {
    /// A device seen for the first time; not editable until its config arrives.
    pub fn new(status: DeviceStatus) -> Self {
        Self {
            status,
            config: None,
            edit: None,
            config_generation: 0,
        }
    }

    /// Build the model for a fresh poll result.
    ///
    /// The last merged configuration is carried over so the row stays
    /// editable until the refreshed configuration arrives. Any edit state of
    /// `previous` is not carried over; callers skip editing devices instead.
    pub fn from_poll(status: DeviceStatus, previous: Option<&DeviceViewModel>) -> Self {
        match previous {
            Some(previous) => Self {
                status,
                config: previous.config.clone(),
                edit: None,
                config_generation: previous.config_generation,
            },
            None => Self::new(status),
        }
    }

    pub fn alias(&self) -> &str {
        &self.status.alias
    }

    pub fn status(&self) -> &DeviceStatus {
        &self.status
    }

    pub fn config(&self) -> Option<&SensorConfig> {
        self.config.as_ref()
    }

    pub fn edit(&self) -> Option<&EditBuffer> {
        self.edit.as_ref()
    }

    /// Generation of the poll that produced the merged configuration.
    pub fn config_generation(&self) -> u64 {
        self.config_generation
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    pub fn is_editable(&self) -> bool {
        self.config.is_some()
    }

    /// Merge a configuration fetched during poll `generation`.
    ///
    /// Returns `false` (and leaves the model untouched) while editing, or when
    /// a newer configuration has already been merged.
    pub fn merge_config(&mut self, config: SensorConfig, generation: u64) -> bool {
        if self.is_editing() || generation < self.config_generation {
            return false;
        }
        self.config = Some(config);
        self.config_generation = generation;
        true
    }

    /// Enter editing state, seeding the buffer from the current configuration.
    ///
    /// Returns the existing buffer if already editing.
    pub fn begin_edit(&mut self, unit: TemperatureUnit) -> Result<&mut EditBuffer> {
        let Some(config) = &self.config else {
            return Err(Error::NotEditable(self.status.alias.clone()));
        };
        Ok(self
            .edit
            .get_or_insert_with(|| EditBuffer::from_config(config, unit)))
    }

    /// Leave editing state, returning the discarded buffer.
    pub fn end_edit(&mut self) -> Option<EditBuffer> {
        self.edit.take()
    }

    /// Assemble the complete record to submit from the pending edit.
    ///
    /// Edited temperatures are converted back to Celsius; untouched fields,
    /// identity and hardware wiring are copied from the last fetched
    /// configuration.
    pub fn build_submission(&self, unit: TemperatureUnit) -> Result<SensorConfig> {
        let (Some(config), Some(edit)) = (&self.config, &self.edit) else {
            return Err(Error::NotEditable(self.status.alias.clone()));
        };

        Ok(SensorConfig {
            high_temp: edit.resolve(config, EditField::HighTemp, unit)?,
            low_temp: edit.resolve(config, EditField::LowTemp, unit)?,
            cool_minutes: edit.resolve(config, EditField::CoolMinutes, unit)?,
            heat_minutes: edit.resolve(config, EditField::HeatMinutes, unit)?,
            cool_disable: !edit.cool_enabled,
            heat_disable: !edit.heat_enabled,
            ..config.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::sample_config;

    fn model_with_config() -> DeviceViewModel {
        let mut model = DeviceViewModel::new(DeviceStatus::new("a", 19.0, false, false));
        assert!(model.merge_config(sample_config("a"), 1));
        model
    }

    #[test]
    fn test_new_model_is_not_editable() {
        let mut model = DeviceViewModel::new(DeviceStatus::new("a", 19.0, false, false));
        assert!(!model.is_editable());
        assert!(matches!(
            model.begin_edit(TemperatureUnit::Celsius),
            Err(Error::NotEditable(alias)) if alias == "a"
        ));
        assert!(!model.is_editing());
    }

    #[test]
    fn test_buffer_seeded_in_display_unit() {
        let mut model = model_with_config();
        let buffer = model.begin_edit(TemperatureUnit::Fahrenheit).unwrap();
        assert_eq!(buffer.high_temp, "68.0");
        assert_eq!(buffer.low_temp, "64.4");
        assert_eq!(buffer.cool_minutes, "10");
        assert_eq!(buffer.heat_minutes, "5");
        assert!(buffer.cool_enabled && buffer.heat_enabled);
    }

    #[test]
    fn test_begin_edit_keeps_existing_buffer() {
        let mut model = model_with_config();
        model
            .begin_edit(TemperatureUnit::Celsius)
            .unwrap()
            .set_field(EditField::HighTemp, "22".to_string());
        let buffer = model.begin_edit(TemperatureUnit::Celsius).unwrap();
        assert_eq!(buffer.high_temp, "22");
    }

    #[test]
    fn test_merge_refused_while_editing_or_stale() {
        let mut model = model_with_config();

        let mut newer = sample_config("a");
        newer.high_temp = 30.0;
        assert!(!model.merge_config(newer.clone(), 0), "stale generation");

        model.begin_edit(TemperatureUnit::Celsius).unwrap();
        assert!(!model.merge_config(newer.clone(), 2), "editing");
        assert_eq!(model.config().unwrap().high_temp, 20.0);

        model.end_edit();
        assert!(model.merge_config(newer, 2));
        assert_eq!(model.config_generation(), 2);
    }

    #[test]
    fn test_submission_converts_and_preserves_wiring() {
        let mut model = model_with_config();
        let buffer = model.begin_edit(TemperatureUnit::Fahrenheit).unwrap();
        buffer.set_field(EditField::HighTemp, "80".to_string());
        buffer.set_field(EditField::CoolMinutes, "2.5".to_string());
        buffer.set_enabled(Mode::Heat, false);

        let record = model.build_submission(TemperatureUnit::Fahrenheit).unwrap();
        assert!((record.high_temp - 26.666_666_666_666_668).abs() < 1e-9);
        assert!((record.low_temp - 18.0).abs() < 1e-9);
        assert_eq!(record.cool_minutes, 2.5);
        assert!(record.heat_disable);
        assert!(!record.cool_disable);

        let original = sample_config("a");
        assert_eq!(record.id, original.id);
        assert_eq!(record.heat_gpio, original.heat_gpio);
        assert_eq!(record.heat_invert, original.heat_invert);
        assert_eq!(record.cool_gpio, original.cool_gpio);
        assert_eq!(record.cool_invert, original.cool_invert);
        assert_eq!(record.verbose, original.verbose);
    }

    #[test]
    fn test_untouched_fields_keep_fetched_precision() {
        for unit in [TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit] {
            let mut config = sample_config("a");
            config.high_temp = 20.25;
            config.low_temp = 17.83;
            let mut model = DeviceViewModel::new(DeviceStatus::new("a", 19.0, false, false));
            assert!(model.merge_config(config, 1));

            let buffer = model.begin_edit(unit).unwrap();
            buffer.set_field(EditField::CoolMinutes, "3".to_string());
            assert!(buffer.is_changed(EditField::CoolMinutes));
            assert!(!buffer.is_changed(EditField::HighTemp));

            let record = model.build_submission(unit).unwrap();
            assert_eq!(record.high_temp, 20.25, "{unit:?}");
            assert_eq!(record.low_temp, 17.83, "{unit:?}");
            assert_eq!(record.cool_minutes, 3.0);
        }
    }

    #[test]
    fn test_toggle_only_keeps_every_number() {
        let mut config = sample_config("a");
        config.high_temp = 21.66;
        let mut model = DeviceViewModel::new(DeviceStatus::new("a", 19.0, false, false));
        assert!(model.merge_config(config.clone(), 1));
        model
            .begin_edit(TemperatureUnit::Fahrenheit)
            .unwrap()
            .set_enabled(Mode::Cool, false);

        let record = model.build_submission(TemperatureUnit::Fahrenheit).unwrap();
        assert!(record.cool_disable);
        assert_eq!(record.high_temp, config.high_temp);
        assert_eq!(record.low_temp, config.low_temp);
    }

    #[test]
    fn test_submission_rejects_unparsable_input() {
        let mut model = model_with_config();
        model
            .begin_edit(TemperatureUnit::Celsius)
            .unwrap()
            .set_field(EditField::LowTemp, "abc".to_string());

        let err = model.build_submission(TemperatureUnit::Celsius).unwrap_err();
        assert_eq!(
            err,
            Error::Validation(ValidationError::InvalidNumber {
                field: EditField::LowTemp,
                input: "abc".to_string(),
            })
        );
    }

    #[test]
    fn test_submission_rejects_negative_minutes() {
        let mut model = model_with_config();
        model
            .begin_edit(TemperatureUnit::Celsius)
            .unwrap()
            .set_field(EditField::HeatMinutes, "-3".to_string());

        assert!(matches!(
            model.build_submission(TemperatureUnit::Celsius),
            Err(Error::Validation(ValidationError::Negative { field: EditField::HeatMinutes, .. }))
        ));
    }

    #[test]
    fn test_negative_temperature_is_allowed() {
        let mut model = model_with_config();
        model
            .begin_edit(TemperatureUnit::Celsius)
            .unwrap()
            .set_field(EditField::LowTemp, "-2.5".to_string());
        let record = model.build_submission(TemperatureUnit::Celsius).unwrap();
        assert_eq!(record.low_temp, -2.5);
    }

    #[test]
    fn test_from_poll_carries_config_but_not_edit() {
        let mut previous = model_with_config();
        previous.begin_edit(TemperatureUnit::Celsius).unwrap();

        let next = DeviceViewModel::from_poll(DeviceStatus::new("a", 21.0, true, false), Some(&previous));
        assert_eq!(next.status().temperature, 21.0);
        assert!(next.is_editable());
        assert!(!next.is_editing());
        assert_eq!(next.config_generation(), 1);
    }
}
