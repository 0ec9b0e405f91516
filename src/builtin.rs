//! Demo capabilities wired into the default gateway binary.

use async_trait::async_trait;
use rmcp::model::{ErrorCode, ErrorData};
use serde_json::{json, Map, Value};

use crate::mcp::RequestContext;
use crate::model::{
    CallToolResult, GetPromptResult, PromptArgument, PromptMessage, PromptSchema,
    ReadResourceResult, ResourceContents, ResourceSchema, ResourceTemplate, ToolSchema,
};
use crate::registry::{Prompt, ResourceDescriptor, ResourceEntry, Tool};

fn missing_argument(name: &str) -> ErrorData {
    ErrorData {
        code: ErrorCode::INVALID_PARAMS,
        message: format!("missing required argument '{name}'").into(),
        data: None,
    }
}

fn string_argument(arguments: &Option<Map<String, Value>>, name: &str) -> Option<String> {
    arguments
        .as_ref()
        .and_then(|args| args.get(name))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Tool that greets the caller by name.
#[derive(Debug)]
pub struct GreeterTool {
    schema: ToolSchema,
}

impl GreeterTool {
    pub fn new() -> Self {
        Self {
            schema: ToolSchema {
                name: "Greeter".to_string(),
                description: Some("Greet the user once.".to_string()),
                input_schema: Some(json!({
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" }
                    }
                })),
                output_schema: None,
                annotations: None,
            },
        }
    }
}

impl Default for GreeterTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GreeterTool {
    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    async fn call(
        &self,
        arguments: Option<Map<String, Value>>,
        _cx: &RequestContext,
    ) -> Result<CallToolResult, ErrorData> {
        let name = string_argument(&arguments, "name").ok_or_else(|| missing_argument("name"))?;
        Ok(CallToolResult::text(format!("Hey {name}! You made it!")))
    }
}

/// Prompt that lets the user choose how the LLM should address them.
pub struct CallMePrompt {
    schema: PromptSchema,
}

impl CallMePrompt {
    pub fn new() -> Self {
        Self {
            schema: PromptSchema {
                name: "Call me prompt".to_string(),
                description: Some("Configure the way the LLM will call you.".to_string()),
                arguments: Some(vec![PromptArgument {
                    name: "honorifics".to_string(),
                    description: Some("The way you want to be called by the LLM.".to_string()),
                    required: Some(true),
                }]),
            },
        }
    }
}

impl Default for CallMePrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prompt for CallMePrompt {
    fn schema(&self) -> &PromptSchema {
        &self.schema
    }

    async fn get(
        &self,
        arguments: Option<Map<String, Value>>,
        _cx: &RequestContext,
    ) -> Result<GetPromptResult, ErrorData> {
        let honorifics = string_argument(&arguments, "honorifics")
            .ok_or_else(|| missing_argument("honorifics"))?;
        Ok(GetPromptResult {
            description: Some("Configuring the way the LLM will call you.".to_string()),
            messages: vec![PromptMessage::text(
                "user",
                format!("Please call me {honorifics}."),
            )],
        })
    }
}

/// Concrete resource serving stubbed user-identifying data.
pub struct UserIdResource {
    descriptor: ResourceDescriptor,
}

impl UserIdResource {
    pub const URI: &'static str = "data://pedro";

    pub fn new() -> Self {
        Self {
            descriptor: ResourceDescriptor::concrete(ResourceSchema {
                uri: Self::URI.to_string(),
                name: "User data identification.".to_string(),
                description: None,
                mime_type: Some("text/plain".to_string()),
            }),
        }
    }
}

impl Default for UserIdResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceEntry for UserIdResource {
    fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    async fn read(
        &self,
        uri: &str,
        _cx: &RequestContext,
    ) -> Result<ReadResourceResult, ErrorData> {
        let content = json!({ "name": "Pedro Paulo", "id": "1234" });
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(
                uri,
                content.to_string(),
                Some("text/plain".to_string()),
            )],
        })
    }
}

/// Template-only resource advertising the user data URI pattern. Not
/// readable; it documents how to address a specific user's resource.
pub struct UserIdTemplate {
    descriptor: ResourceDescriptor,
}

impl UserIdTemplate {
    pub fn new() -> Self {
        Self {
            descriptor: ResourceDescriptor::templated(ResourceTemplate {
                name: "User data identification.".to_string(),
                uri_template: "data://{user}".to_string(),
                description: None,
                mime_type: None,
            }),
        }
    }
}

impl Default for UserIdTemplate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceEntry for UserIdTemplate {
    fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }
}
