//! Color palette for the dashboard.
//!
//! Colors follow the Tailwind CSS palette.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

use tempgopher_types::HvacState;

pub const PRIMARY: Color = Color::Rgb(34, 211, 238); // cyan-400
pub const SUCCESS: Color = Color::Rgb(74, 222, 128); // green-400
pub const WARNING: Color = Color::Rgb(251, 191, 36); // amber-400
pub const DANGER: Color = Color::Rgb(248, 113, 113); // red-400
pub const INFO: Color = Color::Rgb(96, 165, 250); // blue-400
pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // slate-500
pub const BORDER_ACTIVE: Color = Color::Rgb(34, 211, 238);
pub const BORDER_INACTIVE: Color = Color::Rgb(71, 85, 105); // slate-600
pub const BG_SELECTED: Color = Color::Rgb(51, 65, 85); // slate-700

pub const BORDER_TYPE: BorderType = BorderType::Rounded;

/// Color of the heating/cooling label.
pub fn state_color(state: HvacState) -> Color {
    match state {
        HvacState::Heating => DANGER,
        HvacState::Cooling => INFO,
        HvacState::Idle => TEXT_MUTED,
    }
}

/// Style of a focusable control.
pub fn control_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .bg(BG_SELECTED)
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    }
}
