use async_trait::async_trait;
use rmcp::ErrorData;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::CapabilityRegistry;
use crate::error::RegistryError;
use crate::mcp::RequestContext;
use crate::model::{GetPromptResult, PromptSchema};

/// A retrievable prompt: a declared argument list plus an async handler
/// producing role-tagged messages.
#[async_trait]
pub trait Prompt: Send + Sync {
    fn schema(&self) -> &PromptSchema;

    async fn get(
        &self,
        arguments: Option<Map<String, Value>>,
        cx: &RequestContext,
    ) -> Result<GetPromptResult, ErrorData>;
}

/// Registry of prompts keyed by prompt name.
pub struct PromptRegistry {
    inner: CapabilityRegistry<dyn Prompt>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self {
            inner: CapabilityRegistry::new("prompt"),
        }
    }

    /// Registers a prompt under its schema name. Rejects duplicate names.
    pub async fn register(&self, prompt: Arc<dyn Prompt>) -> Result<(), RegistryError> {
        let key = prompt.schema().name.clone();
        self.inner.register(key, prompt).await
    }

    pub async fn list(&self) -> Vec<Arc<dyn Prompt>> {
        self.inner.list().await
    }

    pub async fn resolve(&self, name: &str) -> Result<Arc<dyn Prompt>, RegistryError> {
        self.inner.resolve(name).await
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.is_empty().await
    }
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::new()
    }
}
