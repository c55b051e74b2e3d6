//! Trait abstraction over the thermostat API.
//!
//! The [`ThermostatApi`] trait lets the reconciliation engine run against the
//! real HTTP client or against [`crate::mock::MockApi`] in tests.

use async_trait::async_trait;

use tempgopher_types::{SensorConfig, StatusMap, VersionInfo};

use crate::client::ApiClient;
use crate::error::Result;

/// Operations the dashboard needs from a thermostat server.
///
/// # Example
///
/// ```ignore
/// use tempgopher_core::{ThermostatApi, Result};
///
/// async fn print_aliases<A: ThermostatApi>(api: &A) -> Result<()> {
///     let mut aliases: Vec<_> = api.fetch_statuses().await?.into_keys().collect();
///     aliases.sort();
///     println!("{}", aliases.join(", "));
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ThermostatApi: Send + Sync {
    /// Server version; also used as an authorization probe.
    async fn fetch_version(&self) -> Result<VersionInfo>;

    /// Current status of every sensor, keyed by alias.
    async fn fetch_statuses(&self) -> Result<StatusMap>;

    /// Configuration of one sensor.
    async fn fetch_config(&self, alias: &str) -> Result<SensorConfig>;

    /// Replace the configuration of the given sensors.
    async fn submit_config(&self, configs: &[SensorConfig]) -> Result<()>;
}

#[async_trait]
impl ThermostatApi for ApiClient {
    async fn fetch_version(&self) -> Result<VersionInfo> {
        ApiClient::fetch_version(self).await
    }

    async fn fetch_statuses(&self) -> Result<StatusMap> {
        ApiClient::fetch_statuses(self).await
    }

    async fn fetch_config(&self, alias: &str) -> Result<SensorConfig> {
        ApiClient::fetch_config(self, alias).await
    }

    async fn submit_config(&self, configs: &[SensorConfig]) -> Result<()> {
        ApiClient::submit_config(self, configs).await
    }
}
