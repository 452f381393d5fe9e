use crate::error_code::ErrorCategory;
use std::fmt;
use thiserror::Error;

/// Structured error context for caller-side failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Parameter or configuration key that caused the error (e.g., "date2", "filters")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Stage that raised the error (e.g., "validator", "payload_builder", "config")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A fault reported by the remote service or observed at the transport boundary.
///
/// Service-reported faults carry the API error `code`; transport faults carry the
/// HTTP `status` and the raw body as `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFault {
    pub code: Option<i64>,
    pub status: Option<u16>,
    pub message: String,
    pub detail: Option<String>,
}

impl ServiceFault {
    /// Fault built from an entry of the response `errors` list.
    pub fn reported(code: i64, message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            code: Some(code),
            status: None,
            message: message.into(),
            detail,
        }
    }

    /// Fault built from a non-success HTTP exchange.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self {
            code: None,
            status: Some(status),
            message: body.into(),
            detail: None,
        }
    }

    /// Fault with neither code nor status (connection failures, malformed bodies).
    pub fn local(message: impl Into<String>) -> Self {
        Self {
            code: None,
            status: None,
            message: message.into(),
            detail: None,
        }
    }
}

impl fmt::Display for ServiceFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.status) {
            (Some(code), _) => write!(f, "[{}] {}", code, self.message)?,
            (None, Some(status)) => write!(f, "HTTP {}: {}", status, self.message)?,
            (None, None) => write!(f, "{}", self.message)?,
        }
        if let Some(detail) = self.detail.as_deref().filter(|d| !d.is_empty()) {
            write!(f, ". {}", detail)?;
        }
        Ok(())
    }
}

/// Unified error type for the Topvisor client.
///
/// Every failure leaving the crate is exactly one of these categories.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid request: {message}{}", format_context(.context))]
    InvalidRequest {
        message: String,
        context: ErrorContext,
    },

    #[error("Authentication error: {0}")]
    Authentication(ServiceFault),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(ServiceFault),

    #[error("Server error: {0}")]
    Server(ServiceFault),

    #[error("Topvisor API error: {0}")]
    Generic(ServiceFault),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("parameter: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create an invalid-request error with structured context
    pub fn invalid_request_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::InvalidRequest {
            message: msg.into(),
            context,
        }
    }

    /// Create an invalid-request error naming the offending parameter
    pub fn invalid_parameter(
        param: impl Into<String>,
        msg: impl Into<String>,
        source: &str,
    ) -> Self {
        Error::InvalidRequest {
            message: msg.into(),
            context: ErrorContext::new()
                .with_field_path(param)
                .with_source(source),
        }
    }

    /// Build the error for a classified fault.
    pub fn from_category(category: ErrorCategory, fault: ServiceFault) -> Self {
        match category {
            ErrorCategory::InvalidRequest => Error::InvalidRequest {
                message: fault.to_string(),
                context: ErrorContext::new().with_source("service"),
            },
            ErrorCategory::Authentication => Error::Authentication(fault),
            ErrorCategory::RateLimit => Error::RateLimit(fault),
            ErrorCategory::Server => Error::Server(fault),
            ErrorCategory::Generic => Error::Generic(fault),
        }
    }

    /// Taxonomy member of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidRequest { .. } => ErrorCategory::InvalidRequest,
            Error::Authentication(_) => ErrorCategory::Authentication,
            Error::RateLimit(_) => ErrorCategory::RateLimit,
            Error::Server(_) => ErrorCategory::Server,
            Error::Generic(_) => ErrorCategory::Generic,
        }
    }

    /// Whether a caller-side retry may succeed. Nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        self.category().retryable()
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::InvalidRequest { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Extract the service fault if available
    pub fn fault(&self) -> Option<&ServiceFault> {
        match self {
            Error::Authentication(fault)
            | Error::RateLimit(fault)
            | Error::Server(fault)
            | Error::Generic(fault) => Some(fault),
            Error::InvalidRequest { .. } => None,
        }
    }
}
