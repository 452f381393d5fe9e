//! Endpoint resolution: operation → service → endpoint path.

use crate::operation::{Operation, Service};
use crate::{Error, ErrorContext, Result};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use tracing::debug;

/// Routing data for one service: the endpoint path of each of its operations.
#[derive(Debug)]
pub struct ServiceHandle {
    service: Service,
    endpoints: HashMap<Operation, String>,
}

impl ServiceHandle {
    fn new(service: Service) -> Self {
        let endpoints = Operation::ALL
            .into_iter()
            .filter(|op| op.service() == service)
            .map(|op| (op, op.descriptor().endpoint_path()))
            .collect();
        Self { service, endpoints }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn endpoint(&self, operation: Operation) -> Result<&str> {
        self.endpoints
            .get(&operation)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::invalid_request_with_context(
                    format!(
                        "Operation {} is not served by the {} service",
                        operation,
                        self.service.name()
                    ),
                    ErrorContext::new()
                        .with_field_path("operation")
                        .with_details(operation.name())
                        .with_source("dispatcher"),
                )
            })
    }

    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        self.endpoints.keys().copied()
    }
}

/// Lazily built, per-client registry of service handles.
///
/// Each handle is constructed at most once, even under concurrent first use.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    projects: OnceCell<ServiceHandle>,
    positions: OnceCell<ServiceHandle>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(&self, service: Service) -> &ServiceHandle {
        let cell = match service {
            Service::Projects => &self.projects,
            Service::Positions => &self.positions,
        };
        cell.get_or_init(|| {
            debug!(service = service.name(), "service handle constructed");
            ServiceHandle::new(service)
        })
    }

    /// Look a service up by name; unknown names are an invalid request.
    pub fn service_by_name(&self, name: &str) -> Result<&ServiceHandle> {
        let service: Service = name.parse()?;
        Ok(self.service(service))
    }

    pub fn resolve(&self, operation: Operation) -> Result<&str> {
        self.service(operation.service()).endpoint(operation)
    }

    /// Whether the handle for `service` has been constructed yet.
    pub fn is_initialized(&self, service: Service) -> bool {
        match service {
            Service::Projects => self.projects.get().is_some(),
            Service::Positions => self.positions.get().is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn resolves_every_operation() {
        let registry = ServiceRegistry::new();
        for op in Operation::ALL {
            assert_eq!(
                registry.resolve(op).unwrap(),
                op.descriptor().endpoint_path()
            );
        }
    }

    #[test]
    fn handles_are_built_lazily() {
        let registry = ServiceRegistry::new();
        assert!(!registry.is_initialized(Service::Projects));
        registry.resolve(Operation::GetCompetitors).unwrap();
        assert!(registry.is_initialized(Service::Projects));
        assert!(!registry.is_initialized(Service::Positions));
    }

    #[test]
    fn handle_rejects_foreign_operations() {
        let registry = ServiceRegistry::new();
        let projects = registry.service(Service::Projects);
        assert!(projects.endpoint(Operation::GetHistory).is_err());
        assert_eq!(projects.operations().count(), 2);
    }

    #[test]
    fn unknown_service_name() {
        let registry = ServiceRegistry::new();
        assert!(registry.service_by_name("positions").is_ok());
        assert!(registry.service_by_name("keywords").is_err());
    }

    #[test]
    fn concurrent_first_use_shares_one_handle() {
        let registry = Arc::new(ServiceRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry.service(Service::Positions) as *const ServiceHandle as usize
                })
            })
            .collect();
        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }
}
