use rmcp::model::{ErrorCode, Implementation, ProtocolVersion, ServerCapabilities};
use rmcp::ErrorData;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::transport::StreamableHttpTransport;
use crate::error::{RegistryError, TransportError};
use crate::registry::{Prompt, ResourceEntry, SubscriptionTracker, Tool};

/// Per-request context handed to capability handlers.
///
/// Carries the identity the session was created for and, when the
/// session's transport is connected, a handle for pushing notifications
/// on the same connection.
pub struct RequestContext {
    pub session_id: String,
    pub user_id: String,
    transport: Option<Arc<StreamableHttpTransport>>,
}

impl RequestContext {
    /// Context with no transport attached; pushes are silently dropped.
    pub fn detached(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            transport: None,
        }
    }

    /// Queues a server-initiated notification on the session's stream.
    pub async fn push_notification(
        &self,
        method: &str,
        params: Value,
    ) -> Result<(), TransportError> {
        match &self.transport {
            Some(transport) => transport.push_notification(method, params).await,
            None => Ok(()),
        }
    }
}

/// One session's MCP protocol unit.
///
/// The capability sets are frozen at assembly time: later registry
/// changes are invisible here. Only the subscription tracker stays
/// shared with the registry, so subscriptions taken on this session
/// gate update pushes made through the registry.
pub struct McpServer {
    session_id: String,
    user_id: String,
    server_info: Implementation,
    instructions: Option<String>,
    capabilities: ServerCapabilities,
    tools: Vec<Arc<dyn Tool>>,
    prompts: Vec<Arc<dyn Prompt>>,
    resources: Vec<Arc<dyn ResourceEntry>>,
    subscriptions: Arc<SubscriptionTracker>,
    transport: RwLock<Option<Arc<StreamableHttpTransport>>>,
}

impl McpServer {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        session_id: String,
        user_id: String,
        server_info: Implementation,
        instructions: Option<String>,
        capabilities: ServerCapabilities,
        tools: Vec<Arc<dyn Tool>>,
        prompts: Vec<Arc<dyn Prompt>>,
        resources: Vec<Arc<dyn ResourceEntry>>,
        subscriptions: Arc<SubscriptionTracker>,
    ) -> Self {
        Self {
            session_id,
            user_id,
            server_info,
            instructions,
            capabilities,
            tools,
            prompts,
            resources,
            subscriptions,
            transport: RwLock::new(None),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    /// Attaches the transport requests and pushes flow through.
    pub async fn connect(&self, transport: Arc<StreamableHttpTransport>) {
        tracing::info!(
            session_id = %self.session_id,
            user_id = %self.user_id,
            "server connected to transport"
        );
        *self.transport.write().await = Some(transport);
    }

    /// Handles one JSON-RPC message. Returns `None` for notifications,
    /// otherwise a complete response object, error responses included.
    pub async fn handle_message(&self, message: Value) -> Option<Value> {
        let id = message.get("id").cloned();
        let method = message
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let params = message.get("params").cloned().unwrap_or(Value::Null);

        tracing::debug!(
            session_id = %self.session_id,
            method = %method,
            "handling request"
        );

        if id.is_none() && method.starts_with("notifications/") {
            return None;
        }

        let response = match self.dispatch(&method, params).await {
            Ok(result) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": result,
            }),
            Err(err) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    method = %method,
                    error = %err.message,
                    "request failed"
                );
                json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {
                        "code": err.code.0,
                        "message": err.message,
                        "data": err.data,
                    },
                })
            }
        };
        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, ErrorData> {
        match method {
            "initialize" => self.initialize(),
            "ping" => Ok(json!({})),
            "tools/list" => {
                let tools: Vec<_> = self.tools.iter().map(|t| t.schema()).collect();
                Ok(json!({ "tools": tools }))
            }
            "tools/call" => self.call_tool(params).await,
            "prompts/list" => {
                let prompts: Vec<_> = self.prompts.iter().map(|p| p.schema()).collect();
                Ok(json!({ "prompts": prompts }))
            }
            "prompts/get" => self.get_prompt(params).await,
            "resources/list" => {
                let resources: Vec<_> = self
                    .resources
                    .iter()
                    .filter_map(|r| r.descriptor().schema())
                    .collect();
                Ok(json!({ "resources": resources }))
            }
            "resources/templates/list" => {
                let templates: Vec<_> = self
                    .resources
                    .iter()
                    .filter_map(|r| r.descriptor().template())
                    .collect();
                Ok(json!({ "resourceTemplates": templates }))
            }
            "resources/read" => self.read_resource(params).await,
            "resources/subscribe" => self.subscribe_resource(params).await,
            _ => Err(ErrorData {
                code: ErrorCode::METHOD_NOT_FOUND,
                message: format!("method not recognized: {method}").into(),
                data: None,
            }),
        }
    }

    fn initialize(&self) -> Result<Value, ErrorData> {
        let mut result = json!({
            "protocolVersion": ProtocolVersion::default(),
            "capabilities": self.capabilities,
            "serverInfo": self.server_info,
            "instructions": self.instructions,
        });
        if self.instructions.is_none() {
            if let Some(object) = result.as_object_mut() {
                object.remove("instructions");
            }
        }
        Ok(result)
    }

    async fn call_tool(&self, params: Value) -> Result<Value, ErrorData> {
        let name = require_str(&params, "name", "tools/call")?;
        let arguments = params.get("arguments").and_then(Value::as_object).cloned();
        let tool = self
            .tools
            .iter()
            .find(|t| t.schema().name == name)
            .ok_or_else(|| RegistryError::NotFound {
                kind: "tool",
                key: name.to_string(),
            })?;

        let cx = self.request_context().await;
        let result = tool.call(arguments, &cx).await?;
        serde_json::to_value(result).map_err(internal_error)
    }

    async fn get_prompt(&self, params: Value) -> Result<Value, ErrorData> {
        let name = require_str(&params, "name", "prompts/get")?;
        let arguments = params.get("arguments").and_then(Value::as_object).cloned();
        let prompt = self
            .prompts
            .iter()
            .find(|p| p.schema().name == name)
            .ok_or_else(|| RegistryError::NotFound {
                kind: "prompt",
                key: name.to_string(),
            })?;

        let cx = self.request_context().await;
        let result = prompt.get(arguments, &cx).await?;
        serde_json::to_value(result).map_err(internal_error)
    }

    async fn read_resource(&self, params: Value) -> Result<Value, ErrorData> {
        let uri = require_str(&params, "uri", "resources/read")?;
        let entry = self
            .resources
            .iter()
            .find(|r| r.descriptor().schema().is_some_and(|s| s.uri == uri))
            .ok_or_else(|| RegistryError::NotFound {
                kind: "resource",
                key: uri.to_string(),
            })?;

        let cx = self.request_context().await;
        let result = entry.read(uri, &cx).await?;
        serde_json::to_value(result).map_err(internal_error)
    }

    async fn subscribe_resource(&self, params: Value) -> Result<Value, ErrorData> {
        let uri = require_str(&params, "uri", "resources/subscribe")?;
        tracing::debug!(
            session_id = %self.session_id,
            uri = %uri,
            "resource subscribed"
        );
        self.subscriptions.subscribe(uri).await;
        Ok(json!({}))
    }

    async fn request_context(&self) -> RequestContext {
        RequestContext {
            session_id: self.session_id.clone(),
            user_id: self.user_id.clone(),
            transport: self.transport.read().await.clone(),
        }
    }
}

fn require_str<'a>(params: &'a Value, field: &str, method: &str) -> Result<&'a str, ErrorData> {
    params
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ErrorData {
            code: ErrorCode::INVALID_PARAMS,
            message: format!("{method} requires a string '{field}' parameter").into(),
            data: None,
        })
}

fn internal_error(err: serde_json::Error) -> ErrorData {
    ErrorData {
        code: ErrorCode::INTERNAL_ERROR,
        message: format!("failed to serialize result: {err}").into(),
        data: None,
    }
}
