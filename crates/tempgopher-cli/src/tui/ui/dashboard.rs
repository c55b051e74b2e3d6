//! Device rows.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use tempgopher_core::{ConfigControls, DeviceView, EditField, Mode};

use super::super::app::{App, Control};
use super::theme::{self, BORDER_TYPE};

/// Rows per device block, borders included.
const DEVICE_HEIGHT: u16 = 5;

pub(super) fn draw_devices(frame: &mut Frame, area: Rect, app: &App) {
    if app.devices.is_empty() {
        let text = if app.last_error.is_some() {
            " Waiting for the server..."
        } else {
            " No devices reported"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme::TEXT_MUTED))),
            area,
        );
        return;
    }

    let mut constraints = vec![Constraint::Length(DEVICE_HEIGHT); app.devices.len()];
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (index, device) in app.devices.iter().enumerate() {
        draw_device(frame, rows[index], app, device, index == app.selected);
    }
}

fn draw_device(frame: &mut Frame, area: Rect, app: &App, device: &DeviceView, selected: bool) {
    let border_color = if device.editing {
        theme::WARNING
    } else if selected {
        theme::BORDER_ACTIVE
    } else {
        theme::BORDER_INACTIVE
    };
    let title = if device.editing {
        format!(" {} ✎ ", device.alias)
    } else {
        format!(" {} ", device.alias)
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            device.temperature.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            device.status_label,
            Style::default().fg(theme::state_color(device.state)),
        ),
    ])];

    match &device.controls {
        Some(controls) => {
            let focused = selected.then(|| app.focused_control()).flatten();
            let row = ControlRow {
                app,
                alias: &device.alias,
                controls,
                focused,
            };
            lines.push(row.line(Mode::Cool));
            lines.push(row.line(Mode::Heat));
        }
        None => lines.push(Line::from(Span::styled(
            "Loading configuration...",
            Style::default().fg(theme::TEXT_MUTED),
        ))),
    }

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BORDER_TYPE)
                .border_style(Style::default().fg(border_color))
                .title(title),
        ),
        area,
    );
}

struct ControlRow<'a> {
    app: &'a App,
    alias: &'a str,
    controls: &'a ConfigControls,
    focused: Option<Control>,
}

impl ControlRow<'_> {
    /// "[✓] Cool  Chills for 10 minutes when > 20.0°C"
    fn line(&self, mode: Mode) -> Line<'static> {
        let enabled = self.controls.enabled(mode);
        let label = match mode {
            Mode::Cool => "Cool",
            Mode::Heat => "Heat",
        };
        let mut spans = vec![Span::styled(
            format!("[{}] {} {}", if enabled { "✓" } else { " " }, mode.icon(), label),
            theme::control_style(self.focused == Some(Control::Toggle(mode))),
        )];
        if !self.controls.shows(mode) {
            return Line::from(spans);
        }

        let (verb, threshold, comparison) = match mode {
            Mode::Cool => ("Chills", EditField::HighTemp, ">"),
            Mode::Heat => ("Heats", EditField::LowTemp, "<"),
        };
        let minutes = match mode {
            Mode::Cool => EditField::CoolMinutes,
            Mode::Heat => EditField::HeatMinutes,
        };
        spans.push(Span::raw(format!("  {verb} for ")));
        spans.push(self.value(minutes));
        spans.push(Span::raw(format!(" minutes when {comparison} ")));
        spans.push(self.value(threshold));
        spans.push(Span::raw(self.controls.unit.symbol()));
        Line::from(spans)
    }

    /// A field's value, or the text being typed into it.
    fn value(&self, field: EditField) -> Span<'static> {
        let style = theme::control_style(self.focused == Some(Control::Field(field)));
        match &self.app.input {
            Some(input) if input.alias == self.alias && input.field == field => Span::styled(
                format!("{}_", input.buffer),
                style.add_modifier(Modifier::UNDERLINED),
            ),
            _ => Span::styled(self.controls.value(field).to_string(), style),
        }
    }
}
