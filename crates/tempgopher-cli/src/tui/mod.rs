//! Main entry point for the TUI dashboard.
//!
//! This module ties together all the TUI components and provides the main
//! event loop for the terminal user interface. It handles:
//!
//! - Terminal setup and restoration
//! - Channel creation for worker communication
//! - The main event loop with input handling and rendering
//! - Graceful shutdown coordination

pub mod app;
pub mod input;
pub mod messages;
pub mod ui;
pub mod worker;

pub use app::App;
pub use messages::{Command, DashboardEvent};
pub use worker::DashboardWorker;

use std::io::{self, stdout};
use std::time::Duration;

use anyhow::{Result, bail};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::session::{self, LOGIN_REQUIRED};

/// Set up the terminal for TUI rendering.
///
/// Enables raw mode and switches to the alternate screen buffer.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
pub fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Run the dashboard until the user quits or the server rejects the session.
///
/// The server is probed before the terminal is taken over, so connection
/// and login problems are reported as ordinary errors.
pub async fn run(settings: &Settings) -> Result<()> {
    let (api, version) = session::open(settings).await?;
    info!(url = %settings.base_url, "Starting dashboard");

    // Create communication channels
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(32);
    let (event_tx, event_rx) = mpsc::channel::<DashboardEvent>(32);

    let worker = DashboardWorker::new(
        api,
        settings.reconciler_options(),
        cmd_tx.clone(),
        cmd_rx,
        event_tx,
    );
    let worker_handle = tokio::spawn(worker.run());

    let mut app = App::new(event_rx);
    app.version = Some(version.version);

    let mut terminal = setup_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app, &cmd_tx).await;

    // Send shutdown command to worker
    let _ = cmd_tx.try_send(Command::Shutdown);

    restore_terminal()?;

    // Wait for worker to complete
    let _ = worker_handle.await;

    result?;
    if app.unauthorized {
        bail!(LOGIN_REQUIRED);
    }
    Ok(())
}

/// Main event loop for the TUI.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    command_tx: &mpsc::Sender<Command>,
) -> Result<()> {
    while !app.should_quit() {
        app.clean_expired_messages();

        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for keyboard events with timeout
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let action = input::handle_key(key.code, app.is_typing());
            if let Some(cmd) = input::apply_action(app, action) {
                dispatch(app, command_tx, cmd);
            }
        }

        // Non-blocking receive of worker events
        while let Ok(event) = app.event_rx.try_recv() {
            app.handle_event(event);
        }
    }

    Ok(())
}

/// Queue a command for the worker, telling the user when it was not taken.
fn dispatch(app: &mut App, command_tx: &mpsc::Sender<Command>, cmd: Command) {
    if let Err(e) = command_tx.try_send(cmd) {
        warn!(error = %e, "Dashboard command dropped");
        app.push_status_message("Busy, request not sent; try again".to_string());
    }
}
