//! HTTP client for the TempGopher thermostat API.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tempgopher_core::client::ApiClient;
//! use tempgopher_core::auth::Credentials;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new("http://localhost:8080", Duration::from_secs(10))?
//!     .with_credentials(Credentials::from_login("admin", "secret"));
//!
//! let statuses = client.fetch_statuses().await?;
//! for (alias, status) in &statuses {
//!     println!("{alias}: {:.1}°C {}", status.temperature, status.hvac_state());
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use tempgopher_types::{SensorConfig, StatusMap, VersionInfo};

use crate::auth::Credentials;
use crate::error::{Error, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the thermostat API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    base: Url,
    credentials: Option<Credentials>,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server URL including any path prefix (e.g. "http://pi:8080/thermostat")
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidUrl(format!("failed to build HTTP client: {e}")))?;

        Self::with_client(base_url, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        // Normalize URL (remove trailing slash)
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let base = Url::parse(&base_url).map_err(|e| Error::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidUrl(base_url));
        }

        Ok(Self {
            client,
            base_url,
            base,
            credentials: None,
        })
    }

    /// Attach credentials to every subsequent request.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Replace or clear the stored credentials.
    pub fn set_credentials(&mut self, credentials: Option<Credentials>) {
        self.credentials = credentials;
    }

    /// Whether requests carry an `Authorization` header.
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/version`
    pub async fn fetch_version(&self) -> Result<VersionInfo> {
        let url = self.endpoint(&["api", "version"]);
        self.get(url).await
    }

    /// `GET /api/status/`
    pub async fn fetch_statuses(&self) -> Result<StatusMap> {
        let url = self.endpoint(&["api", "status", ""]);
        self.get(url).await
    }

    /// `GET /api/config/sensors/{alias}`
    pub async fn fetch_config(&self, alias: &str) -> Result<SensorConfig> {
        let url = self.endpoint(&["api", "config", "sensors", alias]);
        self.get(url).await
    }

    /// `POST /api/config/sensors` with complete records.
    ///
    /// The response body carries no contract; only the status is checked.
    pub async fn submit_config(&self, configs: &[SensorConfig]) -> Result<()> {
        let url = self.endpoint(&["api", "config", "sensors"]);
        let response = self.send(Method::POST, &url, Some(configs)).await?;
        Self::check_status(&url, &response)?;
        Ok(())
    }

    // ======================================================================
    // Internal HTTP helpers
    // ======================================================================

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `with_client` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let builder = self.client.request(method, url.clone());
        match &self.credentials {
            Some(credentials) => builder.header(AUTHORIZATION, credentials.header_value()),
            None => builder,
        }
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        debug!(%method, %url, "Sending request");
        let mut builder = self.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
            .send()
            .await
            .map_err(|e| Error::request_failed(url, e))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send::<()>(Method::GET, &url, None).await?;
        Self::check_status(&url, &response)?;

        let status = response.status();
        response.json().await.map_err(|e| Error::RequestFailed {
            url: url.to_string(),
            status: Some(status.as_u16()),
            reason: format!("invalid response body: {e}"),
        })
    }

    fn check_status(url: &Url, response: &reqwest::Response) -> Result<()> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(Error::RequestFailed {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: status.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new("http://localhost:8080", DEFAULT_TIMEOUT);
        assert!(client.is_ok());

        let client = client.unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert!(!client.has_credentials());
    }

    #[test]
    fn test_client_normalizes_url() {
        let client = ApiClient::new("http://localhost:8080/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_invalid_url() {
        let result = ApiClient::new("localhost:8080", DEFAULT_TIMEOUT);
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_endpoints_keep_path_prefix() {
        let client = ApiClient::new("http://pi.local:8080/thermostat/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            client.endpoint(&["api", "status", ""]).as_str(),
            "http://pi.local:8080/thermostat/api/status/"
        );
        assert_eq!(
            client.endpoint(&["api", "version"]).as_str(),
            "http://pi.local:8080/thermostat/api/version"
        );
    }

    #[test]
    fn test_alias_segment_is_encoded() {
        let client = ApiClient::new("http://localhost:8080", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            client
                .endpoint(&["api", "config", "sensors", "beer fridge/2"])
                .as_str(),
            "http://localhost:8080/api/config/sensors/beer%20fridge%2F2"
        );
    }

    #[test]
    fn test_credentials_can_be_cleared() {
        let mut client = ApiClient::new("http://localhost:8080", DEFAULT_TIMEOUT)
            .unwrap()
            .with_credentials(Credentials::from_token("dG9rZW4="));
        assert!(client.has_credentials());
        client.set_credentials(None);
        assert!(!client.has_credentials());
    }
}
