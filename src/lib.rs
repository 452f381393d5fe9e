//! # topvisor-client
//!
//! Typed client for the Topvisor SEO-analytics API.
//!
//! ## Overview
//!
//! Callers invoke a small set of operations with typed (or raw JSON) arguments.
//! The client validates the arguments, builds the canonical request body, routes it
//! to the operation's endpoint, decodes either of the two response encodings and
//! turns service-reported errors into a typed [`Error`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use topvisor_client::{DateSpec, HistoryParams, TopvisorClient};
//!
//! #[tokio::main]
//! async fn main() -> topvisor_client::Result<()> {
//!     let client = TopvisorClient::new("12345", "api-key")?;
//!
//!     let mut params = HistoryParams::new(
//!         1_000_001,
//!         vec![1, 2],
//!         DateSpec::range("2024-01-01", "2024-01-31"),
//!     );
//!     params.show_headers = Some(true);
//!     params.universal.limit = Some(100);
//!
//!     let history = client.get_history(&params).await?;
//!     println!("{}", history.result);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client, builder, validator, payload builder, decoder, classifier |
//! | [`operation`] | Static operation descriptor table |
//! | [`params`] | Typed parameter structs |
//! | [`transport`] | Transport trait and the `reqwest` implementation |
//! | [`error_code`] | Error taxonomy tables |

pub mod client;
pub mod error_code;
pub mod operation;
pub mod params;
pub mod transport;

pub use client::{
    DecodedResponse, ErrorEntry, PreparedRequest, StructuredResponse, TopvisorClient,
    TopvisorClientBuilder,
};
pub use error_code::ErrorCategory;
pub use operation::{Operation, ResponseEncoding, Service};
pub use params::{
    Arguments, CheckerPriceParams, CompetitorsParams, DateSpec, HistoryParams, ProjectsParams,
    SearchersRegionsParams, SummaryChartParams, SummaryParams, UniversalParams,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ServiceFault};
