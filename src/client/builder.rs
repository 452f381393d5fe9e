use crate::client::core::TopvisorClient;
use crate::transport::http::DEFAULT_BASE_URL;
use crate::transport::{Credentials, HttpTransport, Transport};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for creating clients with custom configuration.
///
/// Unset values fall back to the environment:
/// - `TOPVISOR_USER_ID`
/// - `TOPVISOR_API_KEY` (after the OS keyring entry `topvisor` / user id)
/// - `TOPVISOR_BASE_URL` (default `https://api.topvisor.com`)
/// - `TOPVISOR_HTTP_TIMEOUT_SECS` (default 30)
/// - `TOPVISOR_PROXY_URL`
pub struct TopvisorClientBuilder {
    user_id: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl TopvisorClientBuilder {
    pub fn new() -> Self {
        Self {
            user_id: None,
            api_key: None,
            base_url: None,
            timeout: None,
            transport: None,
        }
    }

    /// Account identifier sent as `User-Id`.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Secret key sent as the bearer credential.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the API base URL (mock servers, proxies).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Per-request timeout of the HTTP transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a custom transport. Credentials and URL settings are then ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    fn config_error(message: &str, field: &str) -> Error {
        Error::invalid_request_with_context(
            message,
            ErrorContext::new()
                .with_field_path(field)
                .with_source("config"),
        )
    }

    /// Build the client.
    pub fn build(self) -> Result<TopvisorClient> {
        if let Some(transport) = self.transport {
            return Ok(TopvisorClient::with_transport(transport));
        }

        let user_id = self
            .user_id
            .or_else(|| std::env::var("TOPVISOR_USER_ID").ok())
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| Self::config_error("Topvisor user id is not configured", "user_id"))?;

        let api_key = self
            .api_key
            .or_else(|| Credentials::lookup_api_key(&user_id))
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Self::config_error("Topvisor API key is not configured", "api_key"))?;

        let base_url = self
            .base_url
            .or_else(|| std::env::var("TOPVISOR_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url).map_err(|e| {
            Error::invalid_request_with_context(
                format!("Invalid base URL: {}", base_url),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(e.to_string())
                    .with_source("config"),
            )
        })?;

        let timeout = self.timeout.unwrap_or_else(|| {
            Duration::from_secs(
                std::env::var("TOPVISOR_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            )
        });

        let transport = HttpTransport::new(&base_url, Credentials::new(user_id, api_key), timeout)?;
        Ok(TopvisorClient::with_transport(Arc::new(transport)))
    }
}

impl Default for TopvisorClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
