//! Topvisor client: validation, payload building, dispatch, decoding and error
//! classification. Implementation details are split into submodules under
//! `src/client/`.

pub mod builder;
pub mod core;
pub mod decode;
pub mod endpoint;
pub mod error_classification;
mod operations;
pub mod payload;
pub mod validation;

pub use builder::TopvisorClientBuilder;
pub use self::core::{PreparedRequest, TopvisorClient};
pub use decode::{DecodedResponse, ErrorEntry, StructuredResponse};
pub use endpoint::{ServiceHandle, ServiceRegistry};
pub use payload::{apply_universal_params, Payload};
pub use validation::{DateSelection, ValidatedArgs};
