//! Opening an authorized session with the thermostat server.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use tempgopher_core::{ApiClient, Error, ThermostatApi};
use tempgopher_types::VersionInfo;

use crate::config::Settings;

/// Message shown when the server rejects the session.
pub const LOGIN_REQUIRED: &str =
    "Login required: pass --user/--password (or --token), or set TEMPGOPHER_USER/TEMPGOPHER_PASSWORD";

/// Turn a 401/403 into the login-required error; keep other errors as they are.
pub fn login_error(error: Error) -> anyhow::Error {
    if error.is_unauthorized() {
        anyhow!("{LOGIN_REQUIRED} ({error})")
    } else {
        anyhow::Error::new(error)
    }
}

/// Build the HTTP client described by `settings`.
pub fn client(settings: &Settings) -> Result<ApiClient> {
    let client = ApiClient::new(&settings.base_url, settings.timeout)
        .with_context(|| format!("Cannot use server URL {}", settings.base_url))?;
    Ok(match &settings.credentials {
        Some(credentials) => client.with_credentials(credentials.clone()),
        None => client,
    })
}

/// Probe the version endpoint; a rejection ends the session before it starts.
pub async fn probe<A: ThermostatApi>(api: &A) -> Result<VersionInfo> {
    match api.fetch_version().await {
        Ok(version) => {
            info!(version = %version.version, "Connected");
            Ok(version)
        }
        Err(e) => {
            warn!(error = %e, "Version probe failed");
            Err(login_error(e)).context("Cannot reach the thermostat server")
        }
    }
}

/// Build the client and confirm the server accepts it.
pub async fn open(settings: &Settings) -> Result<(Arc<ApiClient>, VersionInfo)> {
    let api = Arc::new(client(settings)?);
    let version = probe(api.as_ref()).await?;
    Ok((api, version))
}
