//! Tests for protocol unit assembly: capability advertisement and the
//! frozen-snapshot rule.

use serde_json::json;
use std::sync::Arc;

use vestibule::builtin::{CallMePrompt, GreeterTool, UserIdResource, UserIdTemplate};
use vestibule::mcp::ServerAssembler;
use vestibule::registry::{PromptRegistry, ResourceRegistry, ToolRegistry};

async fn initialize(server: &vestibule::mcp::McpServer) -> serde_json::Value {
    server
        .handle_message(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}))
        .await
        .unwrap()
}

#[tokio::test]
async fn empty_registries_advertise_no_capability_groups() {
    let assembler = ServerAssembler::new("1.0.0", None)
        .with_tools(Arc::new(ToolRegistry::new()))
        .with_prompts(Arc::new(PromptRegistry::new()))
        .with_resources(Arc::new(ResourceRegistry::new()));

    let server = assembler.assemble("user-1", "session-1").await;
    let reply = initialize(&server).await;

    let capabilities = &reply["result"]["capabilities"];
    assert!(capabilities.get("tools").is_none());
    assert!(capabilities.get("prompts").is_none());
    assert!(capabilities.get("resources").is_none());
}

#[tokio::test]
async fn populated_registries_advertise_their_groups() {
    let tools = Arc::new(ToolRegistry::new());
    tools.register(Arc::new(GreeterTool::new())).await.unwrap();
    let prompts = Arc::new(PromptRegistry::new());
    prompts
        .register(Arc::new(CallMePrompt::new()))
        .await
        .unwrap();
    let resources = Arc::new(ResourceRegistry::new());
    resources
        .register(Arc::new(UserIdResource::new()))
        .await
        .unwrap();

    let assembler = ServerAssembler::new("1.0.0", None)
        .with_tools(tools)
        .with_prompts(prompts)
        .with_resources(resources);
    let server = assembler.assemble("user-1", "session-1").await;
    let reply = initialize(&server).await;

    let capabilities = &reply["result"]["capabilities"];
    assert_eq!(capabilities["tools"]["listChanged"], true);
    assert_eq!(capabilities["prompts"]["listChanged"], true);
    assert_eq!(capabilities["resources"]["listChanged"], true);
    assert_eq!(capabilities["resources"]["subscribe"], true);
}

#[tokio::test]
async fn server_identity_embeds_the_user_id() {
    let assembler = ServerAssembler::new("2.3.4", Some("be nice".to_string()));
    let server = assembler.assemble("1234567890", "session-1").await;
    let reply = initialize(&server).await;

    assert_eq!(
        reply["result"]["serverInfo"]["name"],
        "server-id-1234567890"
    );
    assert_eq!(reply["result"]["serverInfo"]["version"], "2.3.4");
    assert_eq!(reply["result"]["instructions"], "be nice");
}

#[tokio::test]
async fn capability_sets_are_frozen_at_assembly() {
    let tools = Arc::new(ToolRegistry::new());
    tools.register(Arc::new(GreeterTool::new())).await.unwrap();

    let assembler = ServerAssembler::new("1.0.0", None).with_tools(Arc::clone(&tools));
    let before = assembler.assemble("user-1", "session-1").await;

    // Registered after assembly: visible to new units only.
    #[derive(Debug)]
    struct LateTool {
        schema: vestibule::model::ToolSchema,
    }

    #[async_trait::async_trait]
    impl vestibule::registry::Tool for LateTool {
        fn schema(&self) -> &vestibule::model::ToolSchema {
            &self.schema
        }

        async fn call(
            &self,
            _arguments: Option<serde_json::Map<String, serde_json::Value>>,
            _cx: &vestibule::mcp::RequestContext,
        ) -> Result<vestibule::model::CallToolResult, rmcp::ErrorData> {
            Ok(vestibule::model::CallToolResult::text("late"))
        }
    }

    tools
        .register(Arc::new(LateTool {
            schema: vestibule::model::ToolSchema {
                name: "late".to_string(),
                description: None,
                input_schema: None,
                output_schema: None,
                annotations: None,
            },
        }))
        .await
        .unwrap();

    let after = assembler.assemble("user-1", "session-2").await;

    let list = |reply: serde_json::Value| -> Vec<String> {
        reply["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect()
    };

    let before_reply = before
        .handle_message(json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}))
        .await
        .unwrap();
    let after_reply = after
        .handle_message(json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}))
        .await
        .unwrap();

    assert_eq!(list(before_reply), vec!["Greeter"]);
    assert_eq!(list(after_reply), vec!["Greeter", "late"]);
}

#[tokio::test]
async fn templates_are_listed_but_not_readable() {
    let resources = Arc::new(ResourceRegistry::new());
    resources
        .register(Arc::new(UserIdResource::new()))
        .await
        .unwrap();
    resources
        .register(Arc::new(UserIdTemplate::new()))
        .await
        .unwrap();

    let assembler = ServerAssembler::new("1.0.0", None).with_resources(resources);
    let server = assembler.assemble("user-1", "session-1").await;

    let listed = server
        .handle_message(json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"}))
        .await
        .unwrap();
    let uris: Vec<&str> = listed["result"]["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["uri"].as_str().unwrap())
        .collect();
    assert_eq!(uris, vec!["data://pedro"]);

    let templates = server
        .handle_message(json!({"jsonrpc": "2.0", "id": 2, "method": "resources/templates/list"}))
        .await
        .unwrap();
    let patterns: Vec<&str> = templates["result"]["resourceTemplates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["uriTemplate"].as_str().unwrap())
        .collect();
    assert_eq!(patterns, vec!["data://{user}"]);

    // Reading the template pattern itself is a lookup failure.
    let read = server
        .handle_message(json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "resources/read",
            "params": {"uri": "data://{user}"}
        }))
        .await
        .unwrap();
    assert_eq!(read["error"]["code"], -32601);
}

#[tokio::test]
async fn unknown_method_is_rejected() {
    let assembler = ServerAssembler::new("1.0.0", None);
    let server = assembler.assemble("user-1", "session-1").await;

    let reply = server
        .handle_message(json!({"jsonrpc": "2.0", "id": 9, "method": "nope/nothing"}))
        .await
        .unwrap();
    assert_eq!(reply["error"]["code"], -32601);
    assert_eq!(reply["id"], 9);
}
