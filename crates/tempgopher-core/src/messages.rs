//! Message types for UI/worker communication.
//!
//! ```text
//! +------------------+     Command      +-------------------+
//! |    UI Thread     | --------------> |  DashboardWorker  |
//! |    (ratatui)     |                 |  (tokio runtime)  |
//! |                  | <-------------- |                   |
//! +------------------+  DashboardEvent +-------------------+
//! ```
//!
//! - [`Command`]: Messages sent from the UI thread to the background worker
//! - [`DashboardEvent`]: Events sent from the worker back to the UI thread

use crate::render::DeviceView;
use crate::view_model::{EditField, Mode};

/// Commands sent from the UI thread to the background worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Reconcile now (user request).
    Refresh,

    /// Reconcile because the poll timer fired.
    Tick,

    /// Replace the text of one numeric field.
    Edit {
        alias: String,
        field: EditField,
        value: String,
    },

    /// Enable or disable cooling or heating.
    SetEnabled {
        alias: String,
        mode: Mode,
        enabled: bool,
    },

    /// Submit the pending edit (✔).
    Commit { alias: String },

    /// Discard the pending edit (✘).
    Cancel { alias: String },

    /// Shut down the worker.
    Shutdown,
}

/// Events sent from the background worker to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// The server version was read; the session is authorized.
    VersionLoaded { version: String },

    /// A reconcile pass finished; replaces the whole list.
    DevicesRendered { devices: Vec<DeviceView> },

    /// One row changed (config merged or edit applied).
    DeviceUpdated { device: DeviceView },

    /// A reconcile pass was skipped; the previous list stays.
    RefreshFailed { error: String },

    /// An edit or commit was refused; the edit stays open.
    EditRejected { alias: String, error: String },

    /// The server refused the submitted configuration. The edit is closed.
    SubmitFailed { alias: String, error: String },

    /// The configuration was accepted by the server.
    Committed { alias: String },

    /// The server answered 401/403; the session is over.
    Unauthorized,
}
