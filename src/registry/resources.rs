use async_trait::async_trait;
use rmcp::ErrorData;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{CapabilityRegistry, SubscriptionTracker};
use crate::error::{RegistryError, TransportError};
use crate::mcp::RequestContext;
use crate::model::{ReadResourceResult, ResourceSchema, ResourceTemplate};

/// Identity of a registered resource: a concrete URI schema or a URI
/// template, never both and never neither.
///
/// The invariant is checked when the descriptor is built, so a violating
/// entry can never reach the registry. Registration fails before the
/// registry is queryable, not at read time.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    schema: Option<ResourceSchema>,
    template: Option<ResourceTemplate>,
}

impl ResourceDescriptor {
    /// Builds a descriptor from optional parts, enforcing the XOR
    /// invariant. Used when descriptors arrive from external
    /// configuration where both or neither can be expressed.
    pub fn new(
        schema: Option<ResourceSchema>,
        template: Option<ResourceTemplate>,
    ) -> Result<Self, RegistryError> {
        match (&schema, &template) {
            (Some(_), None) | (None, Some(_)) => Ok(Self { schema, template }),
            (Some(s), Some(_)) => Err(RegistryError::InvalidDescriptor(s.uri.clone())),
            (None, None) => Err(RegistryError::InvalidDescriptor("<unnamed>".to_string())),
        }
    }

    /// Descriptor for a concrete, readable resource.
    pub fn concrete(schema: ResourceSchema) -> Self {
        Self {
            schema: Some(schema),
            template: None,
        }
    }

    /// Descriptor for an advertise-only URI template.
    pub fn templated(template: ResourceTemplate) -> Self {
        Self {
            schema: None,
            template: Some(template),
        }
    }

    pub fn schema(&self) -> Option<&ResourceSchema> {
        self.schema.as_ref()
    }

    pub fn template(&self) -> Option<&ResourceTemplate> {
        self.template.as_ref()
    }

    /// Registry key: the concrete URI, or the template's URI pattern.
    pub fn key(&self) -> &str {
        match (&self.schema, &self.template) {
            (Some(s), _) => &s.uri,
            (None, Some(t)) => &t.uri_template,
            (None, None) => unreachable!("descriptor invariant"),
        }
    }
}

/// A registered resource. Template-only entries keep the default `read`,
/// which reports that the resource is not readable; they exist to be
/// listed, not resolved.
#[async_trait]
pub trait ResourceEntry: Send + Sync {
    fn descriptor(&self) -> &ResourceDescriptor;

    async fn read(
        &self,
        uri: &str,
        _cx: &RequestContext,
    ) -> Result<ReadResourceResult, ErrorData> {
        Err(RegistryError::NotFound {
            kind: "resource",
            key: uri.to_string(),
        }
        .into())
    }
}

/// Destination for resource-updated push events.
///
/// Implemented by the session transport; the registry holds it as a
/// non-owning association purely to reach the active connection when a
/// subscribed resource changes.
#[async_trait]
pub trait UpdateSink: Send + Sync {
    async fn resource_updated(&self, uri: &str, payload: Value) -> Result<(), TransportError>;
}

/// Registry of resources keyed by URI (concrete) or URI template.
///
/// On top of the ordered collection it tracks subscriptions and an
/// optional bound sink for pushing `notifications/resources/updated`.
pub struct ResourceRegistry {
    inner: CapabilityRegistry<dyn ResourceEntry>,
    subscriptions: Arc<SubscriptionTracker>,
    sink: RwLock<Option<Arc<dyn UpdateSink>>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            inner: CapabilityRegistry::new("resource"),
            subscriptions: Arc::new(SubscriptionTracker::new()),
            sink: RwLock::new(None),
        }
    }

    /// Registers a resource under its descriptor key. Rejects duplicates.
    pub async fn register(&self, resource: Arc<dyn ResourceEntry>) -> Result<(), RegistryError> {
        let key = resource.descriptor().key().to_string();
        self.inner.register(key, resource).await
    }

    pub async fn list(&self) -> Vec<Arc<dyn ResourceEntry>> {
        self.inner.list().await
    }

    /// Exact-URI lookup. Template entries only match their literal
    /// pattern string, which never names a readable resource.
    pub async fn resolve(&self, uri: &str) -> Result<Arc<dyn ResourceEntry>, RegistryError> {
        self.inner.resolve(uri).await
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.is_empty().await
    }

    pub fn subscriptions(&self) -> Arc<SubscriptionTracker> {
        Arc::clone(&self.subscriptions)
    }

    /// Marks `uri` as subscribed. Idempotent.
    pub async fn subscribe(&self, uri: &str) {
        tracing::debug!(uri = %uri, "resource subscription added");
        self.subscriptions.subscribe(uri).await;
    }

    /// Binds the sink used for update pushes. The latest connected
    /// transport wins; closing it leaves a stale sink that fails sends
    /// until the next connect rebinds.
    pub async fn bind_sink(&self, sink: Arc<dyn UpdateSink>) {
        *self.sink.write().await = Some(sink);
    }

    /// Pushes a resource-updated event for `uri` carrying `payload`.
    ///
    /// No-op unless `uri` is subscribed and a sink is bound.
    pub async fn notify_update(&self, uri: &str, payload: Value) -> Result<(), TransportError> {
        if !self.subscriptions.contains(uri).await {
            tracing::debug!(uri = %uri, "update dropped: no subscription");
            return Ok(());
        }
        let sink = self.sink.read().await.clone();
        match sink {
            Some(sink) => sink.resource_updated(uri, payload).await,
            None => {
                tracing::debug!(uri = %uri, "update dropped: no active unit");
                Ok(())
            }
        }
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
