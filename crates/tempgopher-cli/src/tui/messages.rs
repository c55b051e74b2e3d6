//! Message types for TUI communication between UI and worker tasks.
//!
//! This module re-exports the shared message types from `tempgopher-core::messages`:
//!
//! - [`Command`]: Messages sent from the UI to the background worker
//! - [`DashboardEvent`]: Events sent from the worker back to the UI

pub use tempgopher_core::messages::{Command, DashboardEvent};
