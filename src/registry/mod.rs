//! Capability registries for tools, prompts, and resources.
//!
//! Each registry is an ordered, key-checked collection behind a
//! `tokio::sync::RwLock`: `list` and `resolve` run on every request and
//! take the read lock; `register` appends under the write lock. The
//! registries are shared across sessions via `Arc`, so dynamic runtime
//! registration is safe, but units assembled earlier keep the snapshot
//! they were built from.

pub mod prompts;
pub mod resources;
pub mod subscriptions;
pub mod tools;

pub use prompts::{Prompt, PromptRegistry};
pub use resources::{ResourceDescriptor, ResourceEntry, ResourceRegistry, UpdateSink};
pub use subscriptions::SubscriptionTracker;
pub use tools::{Tool, ToolRegistry};

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::RegistryError;

/// Ordered collection of capability entries keyed by name or URI.
///
/// Lookup is by exact key match over registration order. Registering a
/// key twice is rejected with [`RegistryError::AlreadyRegistered`] so
/// that no entry can shadow another.
pub struct CapabilityRegistry<T: ?Sized> {
    kind: &'static str,
    entries: RwLock<Vec<(String, Arc<T>)>>,
}

impl<T: ?Sized> CapabilityRegistry<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Appends an entry under `key`.
    pub async fn register(&self, key: String, entry: Arc<T>) -> Result<(), RegistryError> {
        let mut entries = self.entries.write().await;
        if entries.iter().any(|(k, _)| *k == key) {
            return Err(RegistryError::AlreadyRegistered {
                kind: self.kind,
                key,
            });
        }
        tracing::debug!(kind = self.kind, key = %key, "capability registered");
        entries.push((key, entry));
        Ok(())
    }

    /// All entries in registration order.
    pub async fn list(&self) -> Vec<Arc<T>> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(_, e)| Arc::clone(e))
            .collect()
    }

    /// First entry whose key equals `key`.
    pub async fn resolve(&self, key: &str) -> Result<Arc<T>, RegistryError> {
        self.entries
            .read()
            .await
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, e)| Arc::clone(e))
            .ok_or_else(|| RegistryError::NotFound {
                kind: self.kind,
                key: key.to_string(),
            })
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
