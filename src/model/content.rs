use serde::{Deserialize, Serialize};

/// One item in a tool result's `content` array.
///
/// The `type` discriminator on the wire selects text, base64 image or
/// audio data, or an embedded resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentItem {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "image")]
    #[serde(rename_all = "camelCase")]
    Image { data: String, mime_type: String },

    #[serde(rename = "audio")]
    #[serde(rename_all = "camelCase")]
    Audio { data: String, mime_type: String },

    #[serde(rename = "resource")]
    Resource { resource: EmbeddedResource },
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        ContentItem::Text { text: text.into() }
    }
}

/// A resource embedded inside tool output. Exactly one of `text` or
/// `blob` is populated, same as a read result's contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedResource {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,
}
