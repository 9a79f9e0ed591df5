//! Service registry for dispatching calls by (service, method) name.
//!
//! Built mutably during the registration phase, then frozen behind an `Arc`
//! when the server binds. Lookups during serving need no locking.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = ServiceRegistry::new();
//! registry.register(Arc::new(UserService::default()));
//!
//! let login = registry.lookup("UserService", "Login")?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::descriptor::{MethodDescriptor, Service, ServiceDescriptor};
use crate::error::{RpcError, Result};

/// Registry mapping service names to their descriptors.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceDescriptor>,
}

impl ServiceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service under its own name.
    ///
    /// Registering a name that is already present replaces the earlier
    /// service. That is almost always a configuration mistake, so it is
    /// logged.
    pub fn register<S: Service>(&mut self, service: Arc<S>) {
        let descriptor = ServiceDescriptor::from_service(service);
        let name = descriptor.name().to_string();

        tracing::debug!(
            "Registered service {} with methods {:?}",
            name,
            descriptor.method_names()
        );

        if self.services.insert(name.clone(), descriptor).is_some() {
            tracing::warn!("Service {} registered twice, keeping the last", name);
        }
    }

    /// Find the method a call is addressed to.
    ///
    /// # Errors
    ///
    /// - `ServiceNotFound` if no service has this name
    /// - `MethodNotFound` if the service exists but lacks the method
    pub fn lookup(&self, service: &str, method: &str) -> Result<&MethodDescriptor> {
        let descriptor = self
            .services
            .get(service)
            .ok_or_else(|| RpcError::ServiceNotFound(service.to_string()))?;

        descriptor
            .method(method)
            .ok_or_else(|| RpcError::MethodNotFound {
                service: service.to_string(),
                method: method.to_string(),
            })
    }

    /// Get a service descriptor by name.
    pub fn get_service(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.get(name)
    }

    /// Names of all registered services, sorted.
    pub fn service_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterate over registered services.
    pub fn services(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.values()
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// True if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
