//! Transport seam between the dispatcher and the network.
//!
//! The dispatcher hands an endpoint path and a payload to a [`Transport`] and gets
//! back the raw status and body. Any HTTP status is a successful exchange at this
//! level; only faults that produced no response are errors.

pub mod http;

pub use http::{Credentials, HttpTransport};

use crate::client::payload::Payload;
use async_trait::async_trait;
use bytes::Bytes;

/// Raw result of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one payload to one endpoint. Implementations own timeouts and
/// connection policy; callers make a single attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        endpoint: &str,
        payload: &Payload,
        request_id: &str,
    ) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
