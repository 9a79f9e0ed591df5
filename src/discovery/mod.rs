//! Service discovery.
//!
//! A server publishes where each of its methods is served; a channel
//! resolves a method path to an address before connecting. Paths are
//! `/<service>` for the service node and `/<service>/<method>` for each
//! method, with the server's `ip:port` as node data.
//!
//! The trait is the seam for a real coordination service. [`MemoryDiscovery`]
//! is an in-process implementation for tests and single-process setups.

mod memory;

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

pub use memory::MemoryDiscovery;

/// Boxed future returned by [`Discovery`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Publish/resolve interface to a coordination service.
pub trait Discovery: Send + Sync + 'static {
    /// Create a node at `path` holding `data`.
    ///
    /// Publishing a path that already exists leaves it unchanged. Ephemeral
    /// nodes disappear when the publisher's session ends.
    fn publish<'a>(&'a self, path: &'a str, data: &'a str, ephemeral: bool) -> BoxFuture<'a, Result<()>>;

    /// Read the data at `path`, or `DiscoveryNotFound`.
    fn resolve<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String>>;

    /// Whether a node exists at `path`.
    fn exists<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<bool>>;
}

/// Node path for a service.
pub fn service_path(service: &str) -> String {
    format!("/{}", service)
}

/// Node path for one method of a service.
pub fn method_path(service: &str, method: &str) -> String {
    format!("/{}/{}", service, method)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(service_path("UserService"), "/UserService");
        assert_eq!(method_path("UserService", "Login"), "/UserService/Login");
    }
}
