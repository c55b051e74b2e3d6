//! Background worker that drives the reconciliation engine.
//!
//! The [`DashboardWorker`] owns the [`Reconciler`] and runs in its own tokio
//! task so network calls never block rendering. It communicates with the UI
//! through channels:
//!
//! - Receives [`Command`]s from the UI (and from the poll timer)
//! - Sends [`DashboardEvent`]s back to report results
//!
//! The worker `select!`s over incoming commands and config arrivals, so
//! per-device configuration fetches are merged as they complete.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use tempgopher_core::reconcile::{ConfigArrival, Reconciler, ReconcilerOptions};
use tempgopher_core::{DeviceView, Error, Result, ThermostatApi};

use super::messages::{Command, DashboardEvent};

/// Whether the worker keeps running after handling a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Background worker owning the engine.
pub struct DashboardWorker<A: ThermostatApi + 'static> {
    engine: Reconciler<A>,
    arrivals: mpsc::UnboundedReceiver<ConfigArrival>,
    /// Receiver for commands from the UI and the poll timer.
    command_rx: mpsc::Receiver<Command>,
    /// Sender handed to the poll timer.
    tick_tx: mpsc::Sender<Command>,
    /// Sender for events back to the UI.
    event_tx: mpsc::Sender<DashboardEvent>,
}

impl<A: ThermostatApi + 'static> DashboardWorker<A> {
    /// Create a new dashboard worker.
    ///
    /// `command_tx` must be the sending half of `command_rx`; the poll timer
    /// uses it to enqueue [`Command::Tick`].
    pub fn new(
        api: Arc<A>,
        options: ReconcilerOptions,
        command_tx: mpsc::Sender<Command>,
        command_rx: mpsc::Receiver<Command>,
        event_tx: mpsc::Sender<DashboardEvent>,
    ) -> Self {
        let (engine, arrivals) = Reconciler::new(api, options);
        Self {
            engine,
            arrivals,
            command_rx,
            tick_tx: command_tx,
            event_tx,
        }
    }

    /// Run the worker's main loop.
    ///
    /// Probes the version endpoint, performs the first reconcile and starts
    /// the poll timer. Runs until [`Command::Shutdown`], a closed command
    /// channel, or an unauthorized response.
    pub async fn run(mut self) {
        info!("DashboardWorker started");

        if self.startup().await == Flow::Stop {
            return;
        }

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(Command::Shutdown) => {
                            info!("DashboardWorker received shutdown command");
                            break;
                        }
                        Some(cmd) => {
                            if self.handle_command(cmd).await == Flow::Stop {
                                break;
                            }
                        }
                        None => {
                            info!("Command channel closed, shutting down worker");
                            break;
                        }
                    }
                }
                Some(arrival) = self.arrivals.recv() => {
                    if self.handle_arrival(arrival).await == Flow::Stop {
                        break;
                    }
                }
            }
        }

        self.engine.stop_polling();
        info!("DashboardWorker stopped");
    }

    async fn startup(&mut self) -> Flow {
        match self.engine.api().fetch_version().await {
            Ok(version) => {
                self.send(DashboardEvent::VersionLoaded {
                    version: version.version,
                })
                .await;
            }
            Err(e) if e.is_unauthorized() => return self.unauthorized().await,
            Err(e) => warn!(error = %e, "Failed to read server version"),
        }

        if self.refresh().await == Flow::Stop {
            return Flow::Stop;
        }

        let tick_tx = self.tick_tx.clone();
        self.engine.start_polling(move || {
            if tick_tx.try_send(Command::Tick).is_err() {
                debug!("Command queue full, dropping poll tick");
            }
        });
        Flow::Continue
    }

    async fn handle_command(&mut self, cmd: Command) -> Flow {
        debug!(?cmd, "Handling command");
        match cmd {
            Command::Refresh | Command::Tick => self.refresh().await,
            Command::Edit {
                alias,
                field,
                value,
            } => {
                let result = self.engine.edit_field(&alias, field, value);
                self.report_edit(alias, result).await
            }
            Command::SetEnabled {
                alias,
                mode,
                enabled,
            } => {
                let result = self.engine.set_enabled(&alias, mode, enabled);
                self.report_edit(alias, result).await
            }
            Command::Commit { alias } => self.commit(alias).await,
            Command::Cancel { alias } => {
                let result = self.engine.cancel(&alias).await;
                self.report_refresh(result).await
            }
            Command::Shutdown => Flow::Stop,
        }
    }

    async fn handle_arrival(&mut self, arrival: ConfigArrival) -> Flow {
        match self.engine.apply_arrival(arrival) {
            Ok(Some(device)) => {
                self.send(DashboardEvent::DeviceUpdated { device }).await;
                Flow::Continue
            }
            Ok(None) => Flow::Continue,
            Err(e) if e.is_unauthorized() => self.unauthorized().await,
            Err(e) => {
                warn!(error = %e, "Failed to apply configuration");
                Flow::Continue
            }
        }
    }

    async fn refresh(&mut self) -> Flow {
        let result = self.engine.reconcile().await;
        self.report_refresh(result).await
    }

    async fn commit(&mut self, alias: String) -> Flow {
        let outcome = match self.engine.commit(&alias).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.send(DashboardEvent::EditRejected {
                    alias,
                    error: e.to_string(),
                })
                .await;
                return Flow::Continue;
            }
        };

        match outcome.submitted {
            Ok(()) => {
                self.send(DashboardEvent::Committed {
                    alias: alias.clone(),
                })
                .await;
            }
            Err(e) if e.is_unauthorized() => return self.unauthorized().await,
            Err(e) => {
                error!(alias = %alias, error = %e, "Submit failed");
                self.send(DashboardEvent::SubmitFailed {
                    alias: alias.clone(),
                    error: e.to_string(),
                })
                .await;
            }
        }
        self.report_refresh(outcome.refreshed).await
    }

    async fn report_edit(&mut self, alias: String, result: Result<DeviceView>) -> Flow {
        let event = match result {
            Ok(device) => DashboardEvent::DeviceUpdated { device },
            Err(e) => DashboardEvent::EditRejected {
                alias,
                error: e.to_string(),
            },
        };
        self.send(event).await;
        Flow::Continue
    }

    async fn report_refresh(&mut self, result: Result<Vec<DeviceView>>) -> Flow {
        match result {
            Ok(devices) => {
                self.send(DashboardEvent::DevicesRendered { devices }).await;
                Flow::Continue
            }
            Err(e) if e.is_unauthorized() => self.unauthorized().await,
            Err(Error::UnknownDevice(alias)) => {
                debug!(alias = %alias, "Command for a device that is gone");
                Flow::Continue
            }
            Err(e) => {
                self.send(DashboardEvent::RefreshFailed {
                    error: e.to_string(),
                })
                .await;
                Flow::Continue
            }
        }
    }

    async fn unauthorized(&mut self) -> Flow {
        warn!("Server rejected the session");
        self.engine.stop_polling();
        self.send(DashboardEvent::Unauthorized).await;
        Flow::Stop
    }

    async fn send(&self, event: DashboardEvent) {
        if self.event_tx.send(event).await.is_err() {
            debug!("Event receiver dropped");
        }
    }
}
