use crate::client::payload::Payload;
use crate::transport::{Transport, TransportError, TransportResponse};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use keyring::Entry;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Proxy;
use std::env;
use std::fmt;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.topvisor.com";
const KEYRING_SERVICE: &str = "topvisor";

/// Account identifier and secret key sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    api_key: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            api_key: api_key.into(),
        }
    }

    /// Resolve the API key for `user_id`: OS keyring first, then `TOPVISOR_API_KEY`.
    pub fn lookup_api_key(user_id: &str) -> Option<String> {
        if let Ok(entry) = Entry::new(KEYRING_SERVICE, user_id) {
            if let Ok(key) = entry.get_password() {
                return Some(key);
            }
        }
        env::var("TOPVISOR_API_KEY").ok().filter(|k| !k.is_empty())
    }

    pub fn authorization(&self) -> String {
        format!("bearer {}", self.api_key)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// `reqwest`-backed transport: authenticated JSON POSTs against one base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpTransport {
    pub fn new(base_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(timeout);

        if let Ok(proxy_url) = env::var("TOPVISOR_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build().map_err(|e| {
            Error::invalid_request_with_context(
                "failed to construct HTTP client",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("config"),
            )
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        endpoint: &str,
        payload: &Payload,
        request_id: &str,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header("User-Id", &self.credentials.user_id)
            .header(AUTHORIZATION, self.credentials.authorization())
            .header("X-Request-Id", request_id)
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(%url, status, bytes = body.len(), request_id, "HTTP exchange finished");

        Ok(TransportResponse { status, body })
    }
}
