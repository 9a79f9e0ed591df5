//! In-process discovery backed by a map.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{BoxFuture, Discovery};
use crate::error::{RpcError, Result};

#[derive(Debug, Clone)]
struct Node {
    data: String,
    ephemeral: bool,
}

/// Discovery nodes held in memory.
///
/// Share one instance (behind an `Arc`) between servers and channels in the
/// same process.
#[derive(Debug, Default)]
pub struct MemoryDiscovery {
    nodes: RwLock<HashMap<String, Node>>,
}

impl MemoryDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every ephemeral node, as a coordination service does when the
    /// publisher's session expires.
    pub fn expire_session(&self) {
        let mut nodes = self.write_nodes();
        let before = nodes.len();
        nodes.retain(|_, node| !node.ephemeral);
        tracing::debug!("Session expired, removed {} ephemeral node(s)", before - nodes.len());
    }

    /// Number of nodes currently held.
    pub fn len(&self) -> usize {
        self.read_nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Mutations are a single insert or retain; a poisoned table is still whole.
    fn read_nodes(&self) -> RwLockReadGuard<'_, HashMap<String, Node>> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_nodes(&self) -> RwLockWriteGuard<'_, HashMap<String, Node>> {
        self.nodes.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_sync(&self, path: &str, data: &str, ephemeral: bool) -> Result<()> {
        let mut nodes = self.write_nodes();

        if nodes.contains_key(path) {
            tracing::debug!("Discovery node {} already exists", path);
            return Ok(());
        }

        nodes.insert(
            path.to_string(),
            Node {
                data: data.to_string(),
                ephemeral,
            },
        );
        tracing::debug!("Published {} -> {} (ephemeral: {})", path, data, ephemeral);
        Ok(())
    }

    fn resolve_sync(&self, path: &str) -> Result<String> {
        self.read_nodes()
            .get(path)
            .map(|node| node.data.clone())
            .ok_or_else(|| RpcError::DiscoveryNotFound(path.to_string()))
    }

    fn exists_sync(&self, path: &str) -> Result<bool> {
        Ok(self.read_nodes().contains_key(path))
    }
}

impl Discovery for MemoryDiscovery {
    fn publish<'a>(&'a self, path: &'a str, data: &'a str, ephemeral: bool) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move { self.publish_sync(path, data, ephemeral) })
    }

    fn resolve<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move { self.resolve_sync(path) })
    }

    fn exists<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move { self.exists_sync(path) })
    }
}
