use rmcp::model::{Implementation, ServerCapabilities};
use std::sync::Arc;

use super::server::McpServer;
use crate::registry::{PromptRegistry, ResourceRegistry, SubscriptionTracker, ToolRegistry};

/// Builds per-session protocol units from the shared registries.
///
/// One assembler serves the whole gateway. Each call to [`assemble`]
/// snapshots the registries at that moment, so every session keeps the
/// capability set it was created with even if the registries change
/// afterwards.
///
/// [`assemble`]: ServerAssembler::assemble
pub struct ServerAssembler {
    version: String,
    instructions: Option<String>,
    tools: Option<Arc<ToolRegistry>>,
    prompts: Option<Arc<PromptRegistry>>,
    resources: Option<Arc<ResourceRegistry>>,
}

impl ServerAssembler {
    pub fn new(version: impl Into<String>, instructions: Option<String>) -> Self {
        Self {
            version: version.into(),
            instructions,
            tools: None,
            prompts: None,
            resources: None,
        }
    }

    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_prompts(mut self, prompts: Arc<PromptRegistry>) -> Self {
        self.prompts = Some(prompts);
        self
    }

    pub fn with_resources(mut self, resources: Arc<ResourceRegistry>) -> Self {
        self.resources = Some(resources);
        self
    }

    /// The resource registry backing assembled units, if any. The router
    /// uses it to bind each new session's transport as the update sink.
    pub fn resources(&self) -> Option<Arc<ResourceRegistry>> {
        self.resources.clone()
    }

    /// Assembles a protocol unit for one session.
    ///
    /// Capability groups are advertised only when their snapshot is
    /// non-empty; an absent registry and an empty one look the same to
    /// the client.
    pub async fn assemble(&self, user_id: &str, session_id: &str) -> McpServer {
        let tools = match &self.tools {
            Some(registry) => registry.list().await,
            None => Vec::new(),
        };
        let prompts = match &self.prompts {
            Some(registry) => registry.list().await,
            None => Vec::new(),
        };
        let resources = match &self.resources {
            Some(registry) => registry.list().await,
            None => Vec::new(),
        };
        let subscriptions = match &self.resources {
            Some(registry) => registry.subscriptions(),
            None => Arc::new(SubscriptionTracker::new()),
        };

        let mut capabilities = ServerCapabilities::builder()
            .enable_tools()
            .enable_tool_list_changed()
            .enable_prompts()
            .enable_prompts_list_changed()
            .enable_resources()
            .enable_resources_list_changed()
            .enable_resources_subscribe()
            .build();
        if tools.is_empty() {
            capabilities.tools = None;
        }
        if prompts.is_empty() {
            capabilities.prompts = None;
        }
        if resources.is_empty() {
            capabilities.resources = None;
        }

        let server_info = Implementation {
            name: format!("server-id-{user_id}"),
            version: self.version.clone(),
            title: None,
            website_url: None,
            icons: None,
        };

        tracing::debug!(
            session_id = %session_id,
            user_id = %user_id,
            tools = tools.len(),
            prompts = prompts.len(),
            resources = resources.len(),
            "assembled protocol unit"
        );

        McpServer::new(
            session_id.to_string(),
            user_id.to_string(),
            server_info,
            self.instructions.clone(),
            capabilities,
            tools,
            prompts,
            resources,
            subscriptions,
        )
    }
}
