//! The reconciliation engine.
//!
//! A [`Reconciler`] keeps one [`DeviceViewModel`] per alias and arbitrates
//! between background refresh and user edits:
//!
//! ```text
//!            reconcile()                       edit_field() / set_enabled()
//!  ┌──────────────────────────────┐        ┌─────────────────────────────┐
//!  │ fetch statuses               │        │ device enters editing        │
//!  │ skip editing aliases         │        │ (Global scope: timer paused) │
//!  │ recreate the others          │        └──────────────┬──────────────┘
//!  │ spawn one config fetch each  │                       │
//!  └──────────────┬───────────────┘          commit() / cancel()
//!                 │                          ┌────────────▼────────────────┐
//!    ConfigArrival (any order)               │ submit (commit only)         │
//!  ┌──────────────▼───────────────┐          │ leave editing, resume timer  │
//!  │ apply_arrival(): merged only │          │ immediate reconcile()        │
//!  │ if not editing at that time  │          └─────────────────────────────┘
//!  └──────────────────────────────┘
//! ```
//!
//! Config fetches run as independent tasks and report back through the
//! channel returned by [`Reconciler::new`]. The editing guard is checked when
//! an arrival is applied, never when the fetch was issued.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use tempgopher_types::{SensorConfig, TemperatureUnit};

use crate::error::{Error, Result};
use crate::render::{DeviceView, render_device, render_devices};
use crate::scheduler::PollScheduler;
use crate::traits::ThermostatApi;
use crate::view_model::{DeviceViewModel, EditField, Mode};

/// Default refresh period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// What an open edit suspends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuspendScope {
    /// Only the edited device stops refreshing; the timer keeps running.
    #[default]
    Device,
    /// Any edit pauses the timer for every device until no edit is open.
    Global,
}

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcilerOptions {
    pub unit: TemperatureUnit,
    pub poll_interval: Duration,
    pub suspend_scope: SuspendScope,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            unit: TemperatureUnit::Celsius,
            poll_interval: DEFAULT_POLL_INTERVAL,
            suspend_scope: SuspendScope::Device,
        }
    }
}

/// A finished per-device configuration fetch.
#[derive(Debug)]
pub struct ConfigArrival {
    pub alias: String,
    /// Reconcile pass that issued the fetch.
    pub generation: u64,
    pub result: Result<SensorConfig>,
}

/// Result of [`Reconciler::commit`].
///
/// The device has left editing state whatever `submitted` says.
#[derive(Debug)]
pub struct CommitOutcome {
    pub submitted: Result<()>,
    /// The immediate reconcile pass run after the submit.
    pub refreshed: Result<Vec<DeviceView>>,
}

type TickCallback = Arc<dyn Fn() + Send + Sync>;

/// Owner of the device map and the poll timer.
pub struct Reconciler<A: ThermostatApi + 'static> {
    api: Arc<A>,
    options: ReconcilerOptions,
    devices: BTreeMap<String, DeviceViewModel>,
    scheduler: PollScheduler,
    on_tick: Option<TickCallback>,
    arrivals: mpsc::UnboundedSender<ConfigArrival>,
    generation: u64,
    /// Fetches issued but not yet applied.
    pending: usize,
}

impl<A: ThermostatApi + 'static> Reconciler<A> {
    /// Create an engine and the receiver its config fetches report to.
    ///
    /// Feed every received [`ConfigArrival`] back into
    /// [`apply_arrival`](Self::apply_arrival).
    pub fn new(
        api: Arc<A>,
        options: ReconcilerOptions,
    ) -> (Self, mpsc::UnboundedReceiver<ConfigArrival>) {
        let (arrivals, rx) = mpsc::unbounded_channel();
        let reconciler = Self {
            api,
            options,
            devices: BTreeMap::new(),
            scheduler: PollScheduler::new(),
            on_tick: None,
            arrivals,
            generation: 0,
            pending: 0,
        };
        (reconciler, rx)
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn options(&self) -> &ReconcilerOptions {
        &self.options
    }

    /// Start the refresh timer.
    ///
    /// `on_tick` runs on the timer task; it should only signal whoever owns
    /// the engine to call [`reconcile`](Self::reconcile).
    pub fn start_polling<F>(&mut self, on_tick: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_tick = Some(Arc::new(on_tick));
        if self.options.suspend_scope == SuspendScope::Global && self.any_editing() {
            debug!("Edit open, timer starts once it closes");
            return;
        }
        self.restart_timer();
    }

    /// Stop the refresh timer for good.
    pub fn stop_polling(&mut self) {
        self.on_tick = None;
        self.scheduler.pause();
    }

    pub fn is_polling(&self) -> bool {
        self.scheduler.running()
    }

    /// Run one reconciliation pass and return the full ordered view.
    ///
    /// On error nothing changes: an [`Error::Unauthorized`] must end the
    /// session, any other failure just means this tick is skipped.
    pub async fn reconcile(&mut self) -> Result<Vec<DeviceView>> {
        let statuses = match self.api.fetch_statuses().await {
            Ok(statuses) => statuses,
            Err(e) => {
                if e.is_unauthorized() {
                    warn!(error = %e, "Status poll rejected, session is no longer authorized");
                } else {
                    warn!(error = %e, "Status poll failed, keeping previous view");
                }
                return Err(e);
            }
        };

        self.generation += 1;
        let generation = self.generation;

        // BTreeMap iteration gives the lexicographic display order.
        let statuses: BTreeMap<_, _> = statuses.into_iter().collect();

        self.devices.retain(|alias, model| {
            let keep = model.is_editing() || statuses.contains_key(alias);
            if !keep {
                debug!(alias = %alias, "Device no longer reported, removing");
            }
            keep
        });

        let mut refreshed = Vec::with_capacity(statuses.len());
        for (alias, mut status) in statuses {
            let previous = self.devices.get(&alias);
            if previous.is_some_and(DeviceViewModel::is_editing) {
                debug!(alias = %alias, "Device is being edited, skipping");
                continue;
            }
            status.alias.clone_from(&alias);
            if !status.is_consistent() {
                warn!(alias = %alias, "Device reports heating and cooling at once");
            }
            let model = DeviceViewModel::from_poll(status, previous);
            self.devices.insert(alias.clone(), model);
            refreshed.push(alias);
        }

        for alias in &refreshed {
            self.spawn_config_fetch(alias.clone(), generation);
        }

        info!(
            generation,
            devices = self.devices.len(),
            refreshed = refreshed.len(),
            "Reconciled"
        );
        Ok(self.render())
    }

    fn spawn_config_fetch(&mut self, alias: String, generation: u64) {
        let api = Arc::clone(&self.api);
        let tx = self.arrivals.clone();

        self.pending += 1;
        tokio::spawn(async move {
            let result = api.fetch_config(&alias).await;
            let _ = tx.send(ConfigArrival {
                alias,
                generation,
                result,
            });
        });
    }

    /// Merge a finished config fetch.
    ///
    /// Returns the re-rendered row when the merge happened. Arrivals for
    /// removed or editing devices, stale arrivals, and failed fetches are
    /// dropped; only [`Error::Unauthorized`] is returned.
    pub fn apply_arrival(&mut self, arrival: ConfigArrival) -> Result<Option<DeviceView>> {
        let ConfigArrival {
            alias,
            generation,
            result,
        } = arrival;
        self.pending = self.pending.saturating_sub(1);

        let config = match result {
            Ok(config) => config,
            Err(e) if e.is_unauthorized() => return Err(e),
            Err(e) => {
                warn!(alias = %alias, error = %e, "Config fetch failed");
                return Ok(None);
            }
        };

        let unit = self.options.unit;
        let Some(model) = self.devices.get_mut(&alias) else {
            debug!(alias = %alias, "Config arrived for a removed device");
            return Ok(None);
        };
        if model.is_editing() {
            debug!(alias = %alias, generation, "Device is being edited, config discarded");
            return Ok(None);
        }
        if !model.merge_config(config, generation) {
            debug!(alias = %alias, generation, "Stale config discarded");
            return Ok(None);
        }
        Ok(Some(render_device(model, unit)))
    }

    /// Wait for every outstanding config fetch and merge it.
    pub async fn settle(
        &mut self,
        arrivals: &mut mpsc::UnboundedReceiver<ConfigArrival>,
    ) -> Result<()> {
        while self.pending > 0 {
            let Some(arrival) = arrivals.recv().await else {
                break;
            };
            self.apply_arrival(arrival)?;
        }
        Ok(())
    }

    /// Change one numeric field, entering editing state if needed.
    pub fn edit_field(&mut self, alias: &str, field: EditField, value: String) -> Result<DeviceView> {
        let unit = self.options.unit;
        let model = self.model_mut(alias)?;
        let was_editing = model.is_editing();
        model.begin_edit(unit)?.set_field(field, value);
        if !was_editing {
            self.on_edit_opened(alias);
        }
        self.row(alias)
    }

    /// Toggle cooling or heating, entering editing state if needed.
    pub fn set_enabled(&mut self, alias: &str, mode: Mode, enabled: bool) -> Result<DeviceView> {
        let unit = self.options.unit;
        let model = self.model_mut(alias)?;
        let was_editing = model.is_editing();
        model.begin_edit(unit)?.set_enabled(mode, enabled);
        if !was_editing {
            self.on_edit_opened(alias);
        }
        self.row(alias)
    }

    /// Submit the pending edit of `alias` (✔).
    ///
    /// Input that cannot be submitted is rejected with [`Error::Validation`]
    /// and the device stays in editing state. Otherwise the full record is
    /// posted and, whatever the server answers, the edit is closed, the timer
    /// resumed and an immediate reconcile pass run.
    pub async fn commit(&mut self, alias: &str) -> Result<CommitOutcome> {
        let unit = self.options.unit;
        let model = self.model_mut(alias)?;
        if !model.is_editing() {
            return Err(Error::NoPendingEdit(alias.to_string()));
        }
        let record = model.build_submission(unit)?;

        let submitted = self.api.submit_config(std::slice::from_ref(&record)).await;
        match &submitted {
            Ok(()) => info!(alias, "Configuration submitted"),
            Err(e) => warn!(alias, error = %e, "Configuration submit failed"),
        }

        // Fetches issued before the submit must not overwrite the record.
        self.generation += 1;
        let generation = self.generation;
        if let Some(model) = self.devices.get_mut(alias) {
            model.end_edit();
            if submitted.is_ok() {
                model.merge_config(record, generation);
            }
        }
        self.on_edit_closed();

        let refreshed = self.reconcile().await;
        Ok(CommitOutcome {
            submitted,
            refreshed,
        })
    }

    /// Discard the pending edit of `alias` (✘) and refresh immediately.
    pub async fn cancel(&mut self, alias: &str) -> Result<Vec<DeviceView>> {
        let model = self.model_mut(alias)?;
        if model.end_edit().is_some() {
            debug!(alias, "Edit discarded");
        }
        self.on_edit_closed();
        self.reconcile().await
    }

    /// Render every device in display order.
    pub fn render(&self) -> Vec<DeviceView> {
        render_devices(self.devices.values(), self.options.unit)
    }

    pub fn device(&self, alias: &str) -> Option<&DeviceViewModel> {
        self.devices.get(alias)
    }

    /// Aliases in display order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    pub fn is_editing(&self, alias: &str) -> bool {
        self.devices
            .get(alias)
            .is_some_and(DeviceViewModel::is_editing)
    }

    /// Config fetches issued but not yet applied.
    pub fn pending_fetches(&self) -> usize {
        self.pending
    }

    fn any_editing(&self) -> bool {
        self.devices.values().any(DeviceViewModel::is_editing)
    }

    fn model_mut(&mut self, alias: &str) -> Result<&mut DeviceViewModel> {
        self.devices
            .get_mut(alias)
            .ok_or_else(|| Error::UnknownDevice(alias.to_string()))
    }

    fn row(&self, alias: &str) -> Result<DeviceView> {
        self.devices
            .get(alias)
            .map(|model| render_device(model, self.options.unit))
            .ok_or_else(|| Error::UnknownDevice(alias.to_string()))
    }

    fn on_edit_opened(&mut self, alias: &str) {
        debug!(alias, "Edit opened");
        if self.options.suspend_scope == SuspendScope::Global && self.scheduler.pause() {
            info!(alias, "Polling paused while editing");
        }
    }

    fn on_edit_closed(&mut self) {
        if self.options.suspend_scope == SuspendScope::Global && self.any_editing() {
            return;
        }
        self.restart_timer();
    }

    fn restart_timer(&mut self) {
        let Some(on_tick) = &self.on_tick else {
            return;
        };
        let on_tick = Arc::clone(on_tick);
        self.scheduler
            .resume(self.options.poll_interval, move || on_tick());
    }
}
