use async_trait::async_trait;
use rmcp::ErrorData;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::CapabilityRegistry;
use crate::error::RegistryError;
use crate::mcp::RequestContext;
use crate::model::{CallToolResult, ToolSchema};

/// A callable tool: a declared schema plus an async handler.
///
/// The handler receives the raw call arguments and the session's request
/// context, which carries the session/user identity and a handle for
/// out-of-band pushes on the same connection.
#[async_trait]
pub trait Tool: Send + Sync + std::fmt::Debug {
    fn schema(&self) -> &ToolSchema;

    async fn call(
        &self,
        arguments: Option<Map<String, Value>>,
        cx: &RequestContext,
    ) -> Result<CallToolResult, ErrorData>;
}

/// Registry of tools keyed by tool name.
pub struct ToolRegistry {
    inner: CapabilityRegistry<dyn Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            inner: CapabilityRegistry::new("tool"),
        }
    }

    /// Registers a tool under its schema name. Rejects duplicate names.
    pub async fn register(&self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let key = tool.schema().name.clone();
        self.inner.register(key, tool).await
    }

    pub async fn list(&self) -> Vec<Arc<dyn Tool>> {
        self.inner.list().await
    }

    pub async fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, RegistryError> {
        self.inner.resolve(name).await
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.is_empty().await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
