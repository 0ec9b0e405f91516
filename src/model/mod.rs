//! Wire shapes for the MCP capability surface.
//!
//! These are the serde representations exchanged with clients: tool and
//! prompt schemas, resource descriptors, and the content payloads carried
//! by call/get/read results. Capability advertisement itself reuses
//! `rmcp::model::ServerCapabilities`.

pub mod content;
pub mod prompt;
pub mod resource;
pub mod tool;

pub use content::{ContentItem, EmbeddedResource};
pub use prompt::{GetPromptResult, PromptArgument, PromptMessage, PromptSchema};
pub use resource::{ReadResourceResult, ResourceContents, ResourceSchema, ResourceTemplate};
pub use tool::{CallToolResult, ToolAnnotations, ToolSchema};
