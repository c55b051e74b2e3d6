//! Client-side reconciliation engine for TempGopher thermostat dashboards.
//!
//! This crate talks to a TempGopher server over its HTTP API and keeps a
//! live, editable view of every thermostat without letting background
//! refresh overwrite an edit in progress.
//!
//! # Features
//!
//! - **API client**: status, configuration and version endpoints with
//!   optional Basic authentication and request timeouts
//! - **Poll scheduler**: a single recurring refresh timer with pause/resume
//! - **View models**: live status merged with editable configuration
//! - **Reconciliation**: per-device edit isolation, out-of-order config
//!   arrivals, full-record submission preserving hardware wiring fields
//! - **Mock server**: [`MockApi`] for tests, with failure injection
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use tempgopher_core::{ApiClient, Reconciler, ReconcilerOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(ApiClient::new("http://localhost:8080", Duration::from_secs(10))?);
//!     let (mut engine, mut arrivals) = Reconciler::new(client, ReconcilerOptions::default());
//!
//!     engine.reconcile().await?;
//!     engine.settle(&mut arrivals).await?;
//!
//!     for device in engine.render() {
//!         println!("{} {} {}", device.alias, device.temperature, device.status_label);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod messages;
pub mod mock;
pub mod reconcile;
pub mod render;
pub mod scheduler;
pub mod traits;
pub mod view_model;

pub use tempgopher_types::types;
pub use tempgopher_types::units;

pub use auth::Credentials;
pub use client::ApiClient;
pub use error::{Error, Result, ValidationError};
pub use messages::{Command, DashboardEvent};
pub use mock::MockApi;
pub use reconcile::{CommitOutcome, ConfigArrival, Reconciler, ReconcilerOptions, SuspendScope};
pub use render::{ConfigControls, DeviceView};
pub use scheduler::PollScheduler;
pub use traits::ThermostatApi;
pub use view_model::{DeviceViewModel, EditBuffer, EditField, Mode};
