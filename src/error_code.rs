//! Topvisor error taxonomy: maps service error codes and HTTP statuses to
//! caller-facing error categories.
//!
//! | Category         | Service codes | HTTP statuses        |
//! |------------------|---------------|----------------------|
//! | `Authentication` | 53, 54        | 401, 403             |
//! | `RateLimit`      | 429           | 429                  |
//! | `Server`         | 500, 503      | 500, 502, 503, 504   |
//! | `InvalidRequest` | 1000, 1001    | none                 |
//! | `Generic`        | anything else | anything else        |
//!
//! ## Example
//!
//! ```rust
//! use topvisor_client::error_code::ErrorCategory;
//!
//! assert_eq!(ErrorCategory::from_service_code(429), ErrorCategory::RateLimit);
//! assert_eq!(ErrorCategory::from_service_code(9999), ErrorCategory::Generic);
//! assert_eq!(ErrorCategory::from_http_status(503), ErrorCategory::Server);
//! ```

use std::fmt;

/// Caller-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed or contradictory input, unknown operation or parameter type
    InvalidRequest,
    /// Credentials rejected
    Authentication,
    /// Request quota exceeded
    RateLimit,
    /// Remote fault or malformed structured response
    Server,
    /// Code or status absent from the taxonomy
    Generic,
}

/// Service error code taxonomy. Read-only; shared by every client.
static SERVICE_CODES: &[(i64, ErrorCategory)] = &[
    (53, ErrorCategory::Authentication),
    (54, ErrorCategory::Authentication),
    (429, ErrorCategory::RateLimit),
    (500, ErrorCategory::Server),
    (503, ErrorCategory::Server),
    (1000, ErrorCategory::InvalidRequest),
    (1001, ErrorCategory::InvalidRequest),
];

impl ErrorCategory {
    /// Returns the standard name (e.g., `"rate_limit"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Authentication => "authentication",
            Self::RateLimit => "rate_limit",
            Self::Server => "server",
            Self::Generic => "generic",
        }
    }

    /// Returns whether a caller-driven retry may succeed.
    #[inline]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Server)
    }

    /// Looks up a service-reported error code. `None` when the code is not in the table.
    pub fn lookup_service_code(code: i64) -> Option<Self> {
        SERVICE_CODES
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, category)| *category)
    }

    /// Maps a service-reported error code, defaulting to `Generic`.
    pub fn from_service_code(code: i64) -> Self {
        Self::lookup_service_code(code).unwrap_or(Self::Generic)
    }

    /// Maps an HTTP status of a failed exchange, defaulting to `Generic`.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Authentication,
            429 => Self::RateLimit,
            500 | 502 | 503 | 504 => Self::Server,
            _ => Self::Generic,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
