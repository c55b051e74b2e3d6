//! Application state for the TUI dashboard.
//!
//! [`App`] holds the rows last rendered by the worker plus purely local UI
//! state: which device and control have focus, the text being typed into a
//! field, and transient status messages. Local edits are shown immediately
//! and replaced by the worker's authoritative row when it arrives.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use tempgopher_core::{DeviceView, EditField, Mode};

use super::messages::DashboardEvent;

/// How long a status message stays on screen.
const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// A focusable control inside a device row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Toggle(Mode),
    Field(EditField),
}

/// Text being typed into one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    pub alias: String,
    pub field: EditField,
    pub buffer: String,
    /// Text the field showed when typing started.
    pub original: String,
}

/// Main application state for the TUI.
pub struct App {
    /// Receiver for events from the background worker.
    pub event_rx: mpsc::Receiver<DashboardEvent>,
    /// Rows in display order.
    pub devices: Vec<DeviceView>,
    /// Index of the selected device.
    pub selected: usize,
    /// Index into [`App::controls`] of the focused control.
    pub focus: usize,
    /// Field entry in progress.
    pub input: Option<TextInput>,
    /// Server version from the banner probe.
    pub version: Option<String>,
    /// Whether the help overlay is shown.
    pub show_help: bool,
    /// Set when the server rejected the session.
    pub unauthorized: bool,
    /// Last refresh failure, cleared by the next successful render.
    pub last_error: Option<String>,
    pub status_messages: Vec<(String, Instant)>,
    pub should_quit: bool,
}

impl App {
    /// Create a new application state.
    pub fn new(event_rx: mpsc::Receiver<DashboardEvent>) -> Self {
        Self {
            event_rx,
            devices: Vec::new(),
            selected: 0,
            focus: 0,
            input: None,
            version: None,
            show_help: false,
            unauthorized: false,
            last_error: None,
            status_messages: Vec::new(),
            should_quit: false,
        }
    }

    /// Returns whether the application should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Whether text entry is in progress.
    pub fn is_typing(&self) -> bool {
        self.input.is_some()
    }

    pub fn selected_device(&self) -> Option<&DeviceView> {
        self.devices.get(self.selected)
    }

    fn selected_device_mut(&mut self) -> Option<&mut DeviceView> {
        self.devices.get_mut(self.selected)
    }

    /// Focusable controls of a row; hidden inputs are skipped.
    pub fn controls(device: &DeviceView) -> Vec<Control> {
        let Some(controls) = &device.controls else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(6);
        out.push(Control::Toggle(Mode::Cool));
        if controls.shows(Mode::Cool) {
            out.push(Control::Field(EditField::HighTemp));
            out.push(Control::Field(EditField::CoolMinutes));
        }
        out.push(Control::Toggle(Mode::Heat));
        if controls.shows(Mode::Heat) {
            out.push(Control::Field(EditField::LowTemp));
            out.push(Control::Field(EditField::HeatMinutes));
        }
        out
    }

    /// The focused control of the selected device.
    pub fn focused_control(&self) -> Option<Control> {
        let device = self.selected_device()?;
        Self::controls(device).get(self.focus).copied()
    }

    pub fn select_next_device(&mut self) {
        if !self.devices.is_empty() {
            self.selected = (self.selected + 1) % self.devices.len();
            self.focus = 0;
        }
    }

    pub fn select_previous_device(&mut self) {
        if !self.devices.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.devices.len() - 1);
            self.focus = 0;
        }
    }

    pub fn focus_next(&mut self) {
        let count = self.selected_device().map_or(0, |d| Self::controls(d).len());
        if count > 0 {
            self.focus = (self.focus + 1) % count;
        }
    }

    pub fn focus_previous(&mut self) {
        let count = self.selected_device().map_or(0, |d| Self::controls(d).len());
        if count > 0 {
            self.focus = self.focus.checked_sub(1).unwrap_or(count - 1);
        }
    }

    fn clamp_focus(&mut self) {
        let count = self.selected_device().map_or(0, |d| Self::controls(d).len());
        self.focus = self.focus.min(count.saturating_sub(1));
    }

    /// Start typing into `field` of the selected device, prefilled with its value.
    pub fn begin_input(&mut self, field: EditField) -> bool {
        let Some(device) = self.selected_device() else {
            return false;
        };
        let Some(controls) = &device.controls else {
            return false;
        };
        self.input = Some(TextInput {
            alias: device.alias.clone(),
            field,
            buffer: controls.value(field).to_string(),
            original: controls.value(field).to_string(),
        });
        true
    }

    /// Show a typed value locally until the worker confirms it.
    pub fn apply_local_value(&mut self, alias: &str, field: EditField, value: &str) {
        if let Some(device) = self.devices.iter_mut().find(|d| d.alias == alias)
            && let Some(controls) = device.controls.as_mut()
        {
            let slot = match field {
                EditField::HighTemp => &mut controls.high_temp,
                EditField::LowTemp => &mut controls.low_temp,
                EditField::CoolMinutes => &mut controls.cool_minutes,
                EditField::HeatMinutes => &mut controls.heat_minutes,
            };
            *slot = value.to_string();
            device.editing = true;
        }
    }

    /// Flip a toggle of the selected device locally; returns the new state.
    pub fn toggle_local(&mut self, mode: Mode) -> Option<(String, bool)> {
        let device = self.selected_device_mut()?;
        let controls = device.controls.as_mut()?;
        let enabled = match mode {
            Mode::Cool => {
                controls.cool_enabled = !controls.cool_enabled;
                controls.cool_enabled
            }
            Mode::Heat => {
                controls.heat_enabled = !controls.heat_enabled;
                controls.heat_enabled
            }
        };
        device.editing = true;
        let alias = device.alias.clone();
        self.clamp_focus();
        Some((alias, enabled))
    }

    /// Add a status message to the queue.
    pub fn push_status_message(&mut self, message: String) {
        self.status_messages.push((message, Instant::now()));
        // Keep at most 5 messages
        while self.status_messages.len() > 5 {
            self.status_messages.remove(0);
        }
    }

    /// Remove expired status messages.
    pub fn clean_expired_messages(&mut self) {
        self.status_messages
            .retain(|(_, created)| created.elapsed() < STATUS_MESSAGE_TIMEOUT);
    }

    /// Get the current status message to display.
    pub fn current_status_message(&self) -> Option<&str> {
        self.status_messages.last().map(|(msg, _)| msg.as_str())
    }

    /// Replace all rows, keeping the selected device selected.
    fn replace_devices(&mut self, devices: Vec<DeviceView>) {
        let selected_alias = self.selected_device().map(|d| d.alias.clone());
        self.devices = devices;
        self.selected = selected_alias
            .and_then(|alias| self.devices.iter().position(|d| d.alias == alias))
            .unwrap_or_else(|| self.selected.min(self.devices.len().saturating_sub(1)));
        self.clamp_focus();

        if let Some(input) = &self.input
            && !self.devices.iter().any(|d| d.alias == input.alias)
        {
            self.input = None;
        }
    }

    fn update_device(&mut self, device: DeviceView) {
        match self.devices.iter_mut().find(|d| d.alias == device.alias) {
            Some(existing) => *existing = device,
            None => self.devices.push(device),
        }
        self.clamp_focus();
    }

    /// Handle an event from the worker.
    pub fn handle_event(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::VersionLoaded { version } => {
                self.version = Some(version);
            }
            DashboardEvent::DevicesRendered { devices } => {
                self.last_error = None;
                self.replace_devices(devices);
            }
            DashboardEvent::DeviceUpdated { device } => {
                self.update_device(device);
            }
            DashboardEvent::RefreshFailed { error } => {
                self.push_status_message(format!("Refresh failed: {error}"));
                self.last_error = Some(error);
            }
            DashboardEvent::EditRejected { alias, error } => {
                self.push_status_message(format!("{alias}: {error}"));
            }
            DashboardEvent::SubmitFailed { alias, error } => {
                self.push_status_message(format!("{alias}: update failed: {error}"));
            }
            DashboardEvent::Committed { alias } => {
                self.push_status_message(format!("{alias} updated"));
            }
            DashboardEvent::Unauthorized => {
                self.unauthorized = true;
                self.should_quit = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempgopher_core::ConfigControls;
    use tempgopher_types::{HvacState, TemperatureUnit};

    fn row(alias: &str, with_controls: bool) -> DeviceView {
        DeviceView {
            alias: alias.to_string(),
            temperature: "19.0°C".to_string(),
            state: HvacState::Idle,
            status_label: "Idle",
            editing: false,
            controls: with_controls.then(|| ConfigControls {
                unit: TemperatureUnit::Celsius,
                high_temp: "20.0".to_string(),
                low_temp: "18.0".to_string(),
                cool_minutes: "10".to_string(),
                heat_minutes: "5".to_string(),
                cool_enabled: true,
                heat_enabled: true,
            }),
        }
    }

    fn app_with(devices: Vec<DeviceView>) -> App {
        let (_tx, rx) = mpsc::channel(1);
        let mut app = App::new(rx);
        app.handle_event(DashboardEvent::DevicesRendered { devices });
        app
    }

    #[test]
    fn test_controls_skip_hidden_inputs() {
        let mut device = row("fermenter", true);
        assert_eq!(App::controls(&device).len(), 6);

        device.controls.as_mut().unwrap().cool_enabled = false;
        assert_eq!(
            App::controls(&device),
            vec![
                Control::Toggle(Mode::Cool),
                Control::Toggle(Mode::Heat),
                Control::Field(EditField::LowTemp),
                Control::Field(EditField::HeatMinutes),
            ]
        );

        assert!(App::controls(&row("kegerator", false)).is_empty());
    }

    #[test]
    fn test_selection_wraps() {
        let mut app = app_with(vec![row("a", true), row("b", true)]);
        app.select_previous_device();
        assert_eq!(app.selected, 1);
        app.select_next_device();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_focus_wraps() {
        let mut app = app_with(vec![row("a", true)]);
        app.focus_previous();
        assert_eq!(app.focused_control(), Some(Control::Field(EditField::HeatMinutes)));
        app.focus_next();
        assert_eq!(app.focused_control(), Some(Control::Toggle(Mode::Cool)));
    }

    #[test]
    fn test_selection_follows_alias_across_renders() {
        let mut app = app_with(vec![row("a", true), row("b", true)]);
        app.selected = 1;
        app.handle_event(DashboardEvent::DevicesRendered {
            devices: vec![row("0", true), row("a", true), row("b", true)],
        });
        assert_eq!(app.selected_device().unwrap().alias, "b");

        app.handle_event(DashboardEvent::DevicesRendered {
            devices: vec![row("0", true)],
        });
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_toggle_hides_inputs_and_clamps_focus() {
        let mut app = app_with(vec![row("a", true)]);
        app.focus = 5;
        let (alias, enabled) = app.toggle_local(Mode::Heat).unwrap();
        assert_eq!(alias, "a");
        assert!(!enabled);
        assert!(app.selected_device().unwrap().editing);
        assert_eq!(app.focus, 3);
    }

    #[test]
    fn test_local_value_marks_editing() {
        let mut app = app_with(vec![row("a", true)]);
        app.apply_local_value("a", EditField::HighTemp, "21.5");
        let device = app.selected_device().unwrap();
        assert!(device.editing);
        assert_eq!(device.controls.as_ref().unwrap().high_temp, "21.5");
    }

    #[test]
    fn test_begin_input_needs_config() {
        let mut app = app_with(vec![row("a", false)]);
        assert!(!app.begin_input(EditField::HighTemp));

        app.handle_event(DashboardEvent::DeviceUpdated {
            device: row("a", true),
        });
        assert!(app.begin_input(EditField::HighTemp));
        assert_eq!(app.input.as_ref().unwrap().buffer, "20.0");
    }

    #[test]
    fn test_events_produce_messages() {
        let mut app = app_with(vec![row("a", true)]);
        app.handle_event(DashboardEvent::Committed {
            alias: "a".to_string(),
        });
        assert_eq!(app.current_status_message(), Some("a updated"));

        app.handle_event(DashboardEvent::RefreshFailed {
            error: "timed out".to_string(),
        });
        assert_eq!(app.current_status_message(), Some("Refresh failed: timed out"));
        assert_eq!(app.last_error.as_deref(), Some("timed out"));

        app.handle_event(DashboardEvent::Unauthorized);
        assert!(app.unauthorized);
        assert!(app.should_quit());
    }

    #[test]
    fn test_status_messages_capped() {
        let mut app = app_with(Vec::new());
        for i in 0..8 {
            app.push_status_message(format!("m{i}"));
        }
        assert_eq!(app.status_messages.len(), 5);
        assert_eq!(app.current_status_message(), Some("m7"));
    }
}
