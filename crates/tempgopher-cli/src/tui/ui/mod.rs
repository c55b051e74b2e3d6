//! Main UI layout and rendering for the TUI dashboard.
//!
//! The layout consists of:
//!
//! - **Header**: Server version banner
//! - **Main content**: One bordered block per device
//! - **Status bar**: Key hints and status messages

mod dashboard;
pub mod theme;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::app::App;
use theme::BORDER_TYPE;

/// Draw the complete TUI interface.
pub fn draw(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header bar
            Constraint::Min(1),    // Device list
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, main_layout[0], app);
    dashboard::draw_devices(frame, main_layout[1], app);
    draw_status_bar(frame, main_layout[2], app);

    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Banner text: `TempGopher | Version: x` once the version is known.
fn banner(app: &App) -> String {
    match &app.version {
        Some(version) => format!(" TempGopher | Version: {version} "),
        None => " TempGopher ".to_string(),
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        banner(app),
        Style::default()
            .fg(theme::PRIMARY)
            .add_modifier(Modifier::BOLD),
    )];

    let editing = app.devices.iter().filter(|d| d.editing).count();
    if editing > 0 {
        spans.push(Span::styled(
            format!(" EDITING {editing} "),
            Style::default().fg(theme::WARNING),
        ));
    }
    if app.last_error.is_some() {
        spans.push(Span::styled(" ERR ", Style::default().fg(theme::DANGER)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let line = match app.current_status_message() {
        Some(message) => Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(theme::WARNING),
        )),
        None if app.is_typing() => Line::from(Span::styled(
            " Enter accept  Esc abandon  Backspace delete",
            Style::default().fg(theme::TEXT_MUTED),
        )),
        None => Line::from(Span::styled(
            " ↑↓ device  Tab control  Enter edit  s submit ✔  x discard ✘  r refresh  ? help  q quit",
            Style::default().fg(theme::TEXT_MUTED),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_help_overlay(frame: &mut Frame) {
    let area = centered_rect(50, 14, frame.area());
    let rows = [
        ("↑/k ↓/j", "Select device"),
        ("Tab/l BackTab/h", "Move between controls"),
        ("Enter/Space", "Edit field or flip toggle"),
        ("s", "Submit changes"),
        ("x/Esc", "Discard changes"),
        ("r", "Refresh now"),
        ("?", "Close help"),
        ("q", "Quit"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(
                    format!(" {key:<16}"),
                    Style::default().fg(theme::PRIMARY),
                ),
                Span::raw(*what),
            ])
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BORDER_TYPE)
                .border_style(Style::default().fg(theme::BORDER_ACTIVE))
                .title(" Help "),
        ),
        area,
    );
}

/// A rectangle of at most `width` x `height` centered in `area`.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
