//! Error classification logic
//!
//! Turns a service-reported error list or a transport fault into exactly one
//! [`Error`]. Only the first entry of an error list decides the category; the rest
//! are logged and dropped.

use crate::client::decode::{decode_structured, failure_text, ErrorEntry};
use crate::error::ServiceFault;
use crate::error_code::ErrorCategory;
use crate::operation::ResponseEncoding;
use crate::transport::TransportError;
use crate::Error;
use tracing::warn;

/// Classify one service-reported error entry.
pub fn classify_entry(entry: &ErrorEntry) -> Error {
    let category = ErrorCategory::from_service_code(entry.code);
    Error::from_category(
        category,
        ServiceFault::reported(entry.code, entry.message.clone(), entry.detail.clone()),
    )
}

/// Classify a response's error list by its first entry. `None` for an empty list.
pub fn classify_entries(entries: &[ErrorEntry]) -> Option<Error> {
    let (first, rest) = entries.split_first()?;
    for extra in rest {
        warn!(
            code = extra.code,
            message = %extra.message,
            "additional service error not surfaced"
        );
    }
    Some(classify_entry(first))
}

/// Classify a non-success HTTP exchange.
///
/// A body carrying a structured `errors` list is classified by its first entry;
/// otherwise the status code decides and the body text is kept, transcoded per the
/// operation's `encoding`.
pub fn classify_http_failure(status: u16, body: &[u8], encoding: ResponseEncoding) -> Error {
    if let Ok(structured) = decode_structured(body) {
        if let Some(err) = classify_entries(&structured.errors) {
            return err;
        }
    }
    let text = failure_text(body, encoding).trim().to_string();
    Error::from_category(
        ErrorCategory::from_http_status(status),
        ServiceFault::http(status, text),
    )
}

/// Classify a fault raised before any HTTP status was received.
pub fn classify_transport_error(err: &TransportError) -> Error {
    match err {
        TransportError::Http(e) => match e.status() {
            Some(status) => {
                classify_http_failure(status.as_u16(), &[], ResponseEncoding::Structured)
            }
            None => Error::Generic(ServiceFault::local(err.to_string())),
        },
        TransportError::Other(_) => Error::Generic(ServiceFault::local(err.to_string())),
    }
}
