//! Keyboard input handling for the TUI.
//!
//! This module translates keyboard events into high-level actions and
//! applies those actions to the application state.
//!
//! # Key Bindings
//!
//! | Key       | Action                          |
//! |-----------|---------------------------------|
//! | `q`       | Quit                            |
//! | `r`       | Refresh now                     |
//! | `↓` / `j` | Select next device              |
//! | `↑` / `k` | Select previous device          |
//! | `Tab` / `l` | Focus next control            |
//! | `BackTab` / `h` | Focus previous control    |
//! | `Enter` / `Space` | Edit field or flip toggle |
//! | `s`       | Submit pending changes (✔)      |
//! | `x` / `Esc` | Discard pending changes (✘)   |
//! | `?`       | Toggle help                     |
//!
//! While typing into a field: `Enter` accepts, `Esc` abandons, `Backspace`
//! deletes.

use crossterm::event::KeyCode;

use tempgopher_core::EditField;

use super::app::{App, Control};
use super::messages::Command;

/// User actions that can be triggered by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Refresh,
    SelectNext,
    SelectPrevious,
    FocusNext,
    FocusPrevious,
    /// Edit the focused field or flip the focused toggle.
    Activate,
    /// Submit the selected device's pending edit.
    Submit,
    /// Discard the selected device's pending edit.
    Discard,
    ToggleHelp,
    TextInput(char),
    TextBackspace,
    TextSubmit,
    TextCancel,
    /// No action (unrecognized key).
    None,
}

/// Map a key code to an action.
///
/// `typing` is true while a field's text entry is open.
pub fn handle_key(key: KeyCode, typing: bool) -> Action {
    if typing {
        return match key {
            KeyCode::Enter => Action::TextSubmit,
            KeyCode::Esc => Action::TextCancel,
            KeyCode::Backspace => Action::TextBackspace,
            KeyCode::Char(c) => Action::TextInput(c),
            _ => Action::None,
        };
    }

    match key {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Down | KeyCode::Char('j') => Action::SelectNext,
        KeyCode::Up | KeyCode::Char('k') => Action::SelectPrevious,
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => Action::FocusNext,
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => Action::FocusPrevious,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Activate,
        KeyCode::Char('s') => Action::Submit,
        KeyCode::Char('x') | KeyCode::Esc => Action::Discard,
        KeyCode::Char('?') => Action::ToggleHelp,
        _ => Action::None,
    }
}

/// Characters accepted in a numeric field.
fn accepts(field: EditField, c: char) -> bool {
    c.is_ascii_digit() || c == '.' || (c == '-' && field.is_temperature())
}

/// Apply an action to the application state.
///
/// Returns a command when the worker must act; UI-only actions return `None`.
pub fn apply_action(app: &mut App, action: Action) -> Option<Command> {
    match action {
        Action::Quit => {
            app.should_quit = true;
            None
        }
        Action::Refresh => Some(Command::Refresh),
        Action::SelectNext => {
            app.select_next_device();
            None
        }
        Action::SelectPrevious => {
            app.select_previous_device();
            None
        }
        Action::FocusNext => {
            app.focus_next();
            None
        }
        Action::FocusPrevious => {
            app.focus_previous();
            None
        }
        Action::Activate => activate(app),
        Action::Submit => {
            let device = app.selected_device()?;
            if device.editing {
                Some(Command::Commit {
                    alias: device.alias.clone(),
                })
            } else {
                let message = format!("{}: no pending changes", device.alias);
                app.push_status_message(message);
                None
            }
        }
        Action::Discard => {
            let device = app.selected_device()?;
            device.editing.then(|| Command::Cancel {
                alias: device.alias.clone(),
            })
        }
        Action::ToggleHelp => {
            app.show_help = !app.show_help;
            None
        }
        Action::TextInput(c) => {
            if let Some(input) = app.input.as_mut()
                && accepts(input.field, c)
            {
                input.buffer.push(c);
            }
            None
        }
        Action::TextBackspace => {
            if let Some(input) = app.input.as_mut() {
                input.buffer.pop();
            }
            None
        }
        Action::TextSubmit => {
            let input = app.input.take()?;
            if input.buffer == input.original {
                return None;
            }
            app.apply_local_value(&input.alias, input.field, &input.buffer);
            Some(Command::Edit {
                alias: input.alias,
                field: input.field,
                value: input.buffer,
            })
        }
        Action::TextCancel => {
            app.input = None;
            None
        }
        Action::None => None,
    }
}

fn activate(app: &mut App) -> Option<Command> {
    let device = app.selected_device()?;
    if device.controls.is_none() {
        let message = format!("{}: configuration not loaded yet", device.alias);
        app.push_status_message(message);
        return None;
    }

    match app.focused_control()? {
        Control::Field(field) => {
            app.begin_input(field);
            None
        }
        Control::Toggle(mode) => {
            let (alias, enabled) = app.toggle_local(mode)?;
            Some(Command::SetEnabled {
                alias,
                mode,
                enabled,
            })
        }
    }
}
