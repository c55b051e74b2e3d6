//! Mock thermostat server for testing.
//!
//! [`MockApi`] implements [`ThermostatApi`] entirely in memory so the
//! reconciliation engine can be exercised without a network.
//!
//! # Features
//!
//! - **Failure injection**: make status, config, or submit calls fail
//! - **Session expiry**: answer every call with [`Error::Unauthorized`]
//! - **Gated config fetches**: hold a device's config fetch open until the
//!   test releases it, to reproduce out-of-order arrivals
//! - **Submission log**: inspect every record the engine posted

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify, RwLock};

use tempgopher_types::{DeviceStatus, SensorConfig, StatusMap, VersionInfo};

use crate::error::{Error, Result};
use crate::traits::ThermostatApi;

/// An in-memory thermostat server.
///
/// # Example
///
/// ```
/// use tempgopher_core::{MockApi, ThermostatApi};
/// use tempgopher_core::mock::sample_config;
/// use tempgopher_types::DeviceStatus;
///
/// #[tokio::main]
/// async fn main() {
///     let api = MockApi::new()
///         .with_device(DeviceStatus::new("fermenter", 19.5, false, true), sample_config("fermenter"));
///
///     let statuses = api.fetch_statuses().await.unwrap();
///     assert_eq!(statuses["fermenter"].temperature, 19.5);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockApi {
    version: RwLock<String>,
    statuses: RwLock<StatusMap>,
    configs: RwLock<HashMap<String, SensorConfig>>,
    submissions: RwLock<Vec<Vec<SensorConfig>>>,
    unauthorized: AtomicBool,
    fail_statuses: AtomicBool,
    fail_configs: AtomicBool,
    fail_submit: AtomicBool,
    held: Mutex<HashMap<String, Arc<Notify>>>,
    status_calls: AtomicU32,
    config_calls: AtomicU32,
}

impl MockApi {
    /// Create an empty mock server reporting version `0.0.0-mock`.
    pub fn new() -> Self {
        Self {
            version: RwLock::new("0.0.0-mock".to_string()),
            ..Self::default()
        }
    }

    /// Add a device with its status and configuration.
    #[must_use]
    pub fn with_device(mut self, status: DeviceStatus, config: SensorConfig) -> Self {
        self.configs
            .get_mut()
            .insert(status.alias.clone(), config);
        self.statuses.get_mut().insert(status.alias.clone(), status);
        self
    }

    /// Add a device that reports status but has no configuration.
    #[must_use]
    pub fn with_status(mut self, status: DeviceStatus) -> Self {
        self.statuses.get_mut().insert(status.alias.clone(), status);
        self
    }

    /// Replace (or add) a device's status.
    pub async fn set_status(&self, status: DeviceStatus) {
        self.statuses
            .write()
            .await
            .insert(status.alias.clone(), status);
    }

    /// Stop reporting a device.
    pub async fn remove_status(&self, alias: &str) {
        self.statuses.write().await.remove(alias);
    }

    /// Replace (or add) a device's configuration.
    pub async fn set_config(&self, config: SensorConfig) {
        self.configs
            .write()
            .await
            .insert(config.alias.clone(), config);
    }

    /// Set the reported server version.
    pub async fn set_version(&self, version: &str) {
        *self.version.write().await = version.to_string();
    }

    /// Answer every call with 401.
    pub fn set_unauthorized(&self, unauthorized: bool) {
        self.unauthorized.store(unauthorized, Ordering::SeqCst);
    }

    /// Make status fetches fail.
    pub fn set_fail_statuses(&self, fail: bool) {
        self.fail_statuses.store(fail, Ordering::SeqCst);
    }

    /// Make config fetches fail.
    pub fn set_fail_configs(&self, fail: bool) {
        self.fail_configs.store(fail, Ordering::SeqCst);
    }

    /// Make submissions fail (after recording them).
    pub fn set_fail_submit(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::SeqCst);
    }

    /// Hold the next config fetches for `alias` until [`Self::release_config`].
    ///
    /// The held fetch reads the configuration when it is released, not when it
    /// was issued.
    pub async fn hold_config(&self, alias: &str) {
        self.held
            .lock()
            .await
            .insert(alias.to_string(), Arc::new(Notify::new()));
    }

    /// Let a held config fetch for `alias` complete.
    pub async fn release_config(&self, alias: &str) {
        if let Some(gate) = self.held.lock().await.remove(alias) {
            gate.notify_waiters();
            gate.notify_one();
        }
    }

    /// Every submission received, oldest first.
    pub async fn submissions(&self) -> Vec<Vec<SensorConfig>> {
        self.submissions.read().await.clone()
    }

    /// The most recently submitted record, if any.
    pub async fn last_submitted(&self) -> Option<SensorConfig> {
        self.submissions
            .read()
            .await
            .last()
            .and_then(|batch| batch.last().cloned())
    }

    /// Number of status fetches served.
    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Number of config fetches served.
    pub fn config_calls(&self) -> u32 {
        self.config_calls.load(Ordering::SeqCst)
    }

    fn check_session(&self) -> Result<()> {
        if self.unauthorized.load(Ordering::SeqCst) {
            Err(Error::Unauthorized { status: 401 })
        } else {
            Ok(())
        }
    }

    fn failure(operation: &str) -> Error {
        Error::RequestFailed {
            url: format!("mock://{operation}"),
            status: Some(500),
            reason: "Mock failure".to_string(),
        }
    }
}

#[async_trait]
impl ThermostatApi for MockApi {
    async fn fetch_version(&self) -> Result<VersionInfo> {
        self.check_session()?;
        Ok(VersionInfo {
            version: self.version.read().await.clone(),
        })
    }

    async fn fetch_statuses(&self) -> Result<StatusMap> {
        self.check_session()?;
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_statuses.load(Ordering::SeqCst) {
            return Err(Self::failure("status"));
        }
        Ok(self.statuses.read().await.clone())
    }

    async fn fetch_config(&self, alias: &str) -> Result<SensorConfig> {
        let gate = self.held.lock().await.get(alias).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.check_session()?;
        self.config_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_configs.load(Ordering::SeqCst) {
            return Err(Self::failure("config"));
        }
        self.configs
            .read()
            .await
            .get(alias)
            .cloned()
            .ok_or_else(|| Error::RequestFailed {
                url: format!("mock://config/{alias}"),
                status: Some(404),
                reason: "Not Found".to_string(),
            })
    }

    async fn submit_config(&self, configs: &[SensorConfig]) -> Result<()> {
        self.check_session()?;
        self.submissions.write().await.push(configs.to_vec());
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(Self::failure("submit"));
        }
        let mut stored = self.configs.write().await;
        for config in configs {
            stored.insert(config.alias.clone(), config.clone());
        }
        Ok(())
    }
}

/// A plausible configuration for `alias`: cool above 20 °C for 10 minutes,
/// heat below 18 °C for 5 minutes, both enabled, with non-default wiring.
pub fn sample_config(alias: &str) -> SensorConfig {
    SensorConfig {
        id: format!("28-{alias}"),
        alias: alias.to_string(),
        high_temp: 20.0,
        low_temp: 18.0,
        heat_gpio: 5,
        heat_invert: true,
        heat_minutes: 5.0,
        heat_disable: false,
        cool_gpio: 17,
        cool_invert: false,
        cool_minutes: 10.0,
        cool_disable: false,
        verbose: true,
    }
}
