//! Pure rendering of view models into display structures.
//!
//! Nothing here touches the network or timers; front-ends call
//! [`render_devices`] again on every cycle instead of keeping views around.

use serde::Serialize;

use tempgopher_types::units::format_temperature;
use tempgopher_types::{HvacState, TemperatureUnit};

use crate::view_model::{DeviceViewModel, EditField, Mode, format_field};

/// One dashboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceView {
    pub alias: String,
    /// Current temperature with one decimal and the unit symbol.
    pub temperature: String,
    pub state: HvacState,
    pub status_label: &'static str,
    pub editing: bool,
    /// Present once the device's configuration has been fetched.
    pub controls: Option<ConfigControls>,
}

/// Editable configuration controls of a row.
///
/// Values come from the pending edit while editing, otherwise from the last
/// fetched configuration converted to the display unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigControls {
    pub unit: TemperatureUnit,
    pub high_temp: String,
    pub low_temp: String,
    pub cool_minutes: String,
    pub heat_minutes: String,
    pub cool_enabled: bool,
    pub heat_enabled: bool,
}

impl ConfigControls {
    pub fn value(&self, field: EditField) -> &str {
        match field {
            EditField::HighTemp => &self.high_temp,
            EditField::LowTemp => &self.low_temp,
            EditField::CoolMinutes => &self.cool_minutes,
            EditField::HeatMinutes => &self.heat_minutes,
        }
    }

    pub fn enabled(&self, mode: Mode) -> bool {
        match mode {
            Mode::Cool => self.cool_enabled,
            Mode::Heat => self.heat_enabled,
        }
    }

    /// Whether the numeric inputs of `mode` are shown.
    ///
    /// A disabled output hides its inputs; its toggle stays visible.
    pub fn shows(&self, mode: Mode) -> bool {
        self.enabled(mode)
    }

    /// "Chills for 10 minutes when > 68.0°F"
    pub fn cool_sentence(&self) -> String {
        format!(
            "Chills for {} minutes when > {}{}",
            self.cool_minutes,
            self.high_temp,
            self.unit.symbol()
        )
    }

    /// "Heats for 5 minutes when < 64.4°F"
    pub fn heat_sentence(&self) -> String {
        format!(
            "Heats for {} minutes when < {}{}",
            self.heat_minutes,
            self.low_temp,
            self.unit.symbol()
        )
    }
}

/// Render a single device.
pub fn render_device(model: &DeviceViewModel, unit: TemperatureUnit) -> DeviceView {
    let status = model.status();
    let state = status.hvac_state();

    let controls = match (model.edit(), model.config()) {
        (Some(edit), Some(_)) => Some(ConfigControls {
            unit,
            high_temp: edit.high_temp.clone(),
            low_temp: edit.low_temp.clone(),
            cool_minutes: edit.cool_minutes.clone(),
            heat_minutes: edit.heat_minutes.clone(),
            cool_enabled: edit.cool_enabled,
            heat_enabled: edit.heat_enabled,
        }),
        (None, Some(config)) => Some(ConfigControls {
            unit,
            high_temp: format_field(config, EditField::HighTemp, unit),
            low_temp: format_field(config, EditField::LowTemp, unit),
            cool_minutes: format_field(config, EditField::CoolMinutes, unit),
            heat_minutes: format_field(config, EditField::HeatMinutes, unit),
            cool_enabled: !config.cool_disable,
            heat_enabled: !config.heat_disable,
        }),
        _ => None,
    };

    DeviceView {
        alias: status.alias.clone(),
        temperature: format_temperature(status.temperature, unit),
        state,
        status_label: state.label(),
        editing: model.is_editing(),
        controls,
    }
}

/// Render devices in iteration order.
pub fn render_devices<'a>(
    models: impl IntoIterator<Item = &'a DeviceViewModel>,
    unit: TemperatureUnit,
) -> Vec<DeviceView> {
    models
        .into_iter()
        .map(|model| render_device(model, unit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::sample_config;
    use tempgopher_types::DeviceStatus;

    fn model(heating: bool, cooling: bool) -> DeviceViewModel {
        DeviceViewModel::new(DeviceStatus::new("cellar", 12.34, heating, cooling))
    }

    #[test]
    fn test_status_label_precedence() {
        let unit = TemperatureUnit::Celsius;
        assert_eq!(render_device(&model(false, false), unit).status_label, "Idle");
        assert_eq!(render_device(&model(false, true), unit).status_label, "Cooling");
        assert_eq!(render_device(&model(true, false), unit).status_label, "Heating");
        assert_eq!(render_device(&model(true, true), unit).status_label, "Heating");
    }

    #[test]
    fn test_temperature_converted_to_display_unit() {
        let view = render_device(&model(false, false), TemperatureUnit::Fahrenheit);
        assert_eq!(view.temperature, "54.2°F");
        assert!(view.controls.is_none());
    }

    #[test]
    fn test_controls_from_config() {
        let mut m = model(false, false);
        let mut config = sample_config("cellar");
        config.heat_disable = true;
        m.merge_config(config, 1);

        let controls = render_device(&m, TemperatureUnit::Fahrenheit).controls.unwrap();
        assert_eq!(controls.high_temp, "68.0");
        assert_eq!(controls.cool_sentence(), "Chills for 10 minutes when > 68.0°F");
        assert_eq!(controls.heat_sentence(), "Heats for 5 minutes when < 64.4°F");
        assert!(controls.shows(Mode::Cool));
        assert!(!controls.shows(Mode::Heat));
    }

    #[test]
    fn test_controls_from_edit_buffer() {
        let mut m = model(false, false);
        m.merge_config(sample_config("cellar"), 1);
        let buffer = m.begin_edit(TemperatureUnit::Celsius).unwrap();
        buffer.set_field(EditField::HighTemp, "2".to_string());
        buffer.set_enabled(Mode::Cool, false);

        let view = render_device(&m, TemperatureUnit::Celsius);
        assert!(view.editing);
        let controls = view.controls.unwrap();
        assert_eq!(controls.value(EditField::HighTemp), "2");
        assert!(!controls.shows(Mode::Cool));
    }

    #[test]
    fn test_view_serializes() {
        let view = render_device(&model(true, false), TemperatureUnit::Celsius);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["alias"], "cellar");
        assert_eq!(json["state"], "heating");
        assert_eq!(json["controls"], serde_json::Value::Null);
    }
}
