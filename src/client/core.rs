use crate::client::decode::{self, DecodedResponse};
use crate::client::endpoint::ServiceRegistry;
use crate::client::error_classification::{
    classify_entries, classify_http_failure, classify_transport_error,
};
use crate::client::payload::{build_payload, Payload};
use crate::client::validation::validate;
use crate::operation::Operation;
use crate::params::Arguments;
use crate::transport::Transport;
use crate::Result;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// Topvisor API client.
///
/// Every call runs validation → payload building → one transport exchange →
/// decoding → error classification. Nothing is retried.
pub struct TopvisorClient {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) registry: ServiceRegistry,
}

/// A validated, routed request that has not been sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub operation: Operation,
    pub endpoint: String,
    pub payload: Payload,
}

impl TopvisorClient {
    /// Create a client with credentials; remaining settings come from the environment.
    pub fn new(user_id: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        crate::client::builder::TopvisorClientBuilder::new()
            .user_id(user_id)
            .api_key(api_key)
            .build()
    }

    pub fn builder() -> crate::client::builder::TopvisorClientBuilder {
        crate::client::builder::TopvisorClientBuilder::new()
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            registry: ServiceRegistry::new(),
        }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Execute an operation by name with raw arguments.
    ///
    /// Unknown operation names fail with `InvalidRequest` before any I/O.
    pub async fn execute(&self, operation: &str, args: Arguments) -> Result<DecodedResponse> {
        let operation: Operation = operation.parse()?;
        self.execute_operation(operation, &args).await
    }

    /// Validate, build and route a request without sending it.
    pub fn prepare(&self, operation: Operation, args: &Arguments) -> Result<PreparedRequest> {
        let validated = validate(operation.descriptor(), args)?;
        let payload = build_payload(&validated)?;
        let endpoint = self.registry.resolve(operation)?.to_string();
        Ok(PreparedRequest {
            operation,
            endpoint,
            payload,
        })
    }

    pub async fn execute_operation(
        &self,
        operation: Operation,
        args: &Arguments,
    ) -> Result<DecodedResponse> {
        let prepared = self.prepare(operation, args)?;
        self.dispatch(prepared).await
    }

    /// Send a prepared request and interpret the answer.
    pub async fn dispatch(&self, request: PreparedRequest) -> Result<DecodedResponse> {
        let descriptor = request.operation.descriptor();
        let request_id = Uuid::new_v4().to_string();
        debug!(
            operation = %request.operation,
            endpoint = %request.endpoint,
            request_id = %request_id,
            fields = request.payload.len(),
            "dispatching request"
        );

        let response = match self
            .transport
            .send(&request.endpoint, &request.payload, &request_id)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(operation = %request.operation, request_id = %request_id, error = %e, "transport fault");
                return Err(classify_transport_error(&e));
            }
        };

        if !response.is_success() {
            let err =
                classify_http_failure(response.status, &response.body, descriptor.encoding);
            error!(
                operation = %request.operation,
                request_id = %request_id,
                status = response.status,
                error = %err,
                "request failed"
            );
            return Err(err);
        }

        let decoded = decode::decode(&response.body, descriptor.encoding)?;
        if let DecodedResponse::Structured(structured) = &decoded {
            if let Some(err) = classify_entries(&structured.errors) {
                error!(
                    operation = %request.operation,
                    request_id = %request_id,
                    error = %err,
                    "service reported an error"
                );
                return Err(err);
            }
        }

        debug!(operation = %request.operation, request_id = %request_id, "request succeeded");
        Ok(decoded)
    }
}
