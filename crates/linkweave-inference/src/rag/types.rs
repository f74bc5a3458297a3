//! Knowledge-base chat API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Body for `POST /api/conversation/get_id`. Always `{"conversation_id": null}`.
#[derive(Debug, Default, Serialize)]
pub struct ConversationRequest {
    pub conversation_id: Option<String>,
}

/// Response from `get_id`.
#[derive(Debug, Deserialize)]
pub struct ConversationResponse {
    #[serde(rename = "conversationId", default)]
    pub conversation_id: Option<JsonValue>,
}

impl ConversationResponse {
    /// The handle as text, or `None` when missing or falsy
    /// (`null`, `false`, `""`, `0`).
    pub fn handle(&self) -> Option<String> {
        match self.conversation_id.as_ref()? {
            JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            JsonValue::Number(n) if n.as_f64().map(|f| f != 0.0).unwrap_or(false) => {
                Some(n.to_string())
            }
            _ => None,
        }
    }
}

/// Body for `POST /api/chat/{conversationId}`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub user_ip: &'a str,
    pub message: &'a str,
    pub user_type: &'a str,
}

/// Response from the chat call. Only `sources` is consumed.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub sources: Option<Vec<JsonValue>>,
}

/// One provider source, read leniently field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSource {
    pub title: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub deep_link_url: Option<String>,
    pub text: Option<String>,
}

impl RawSource {
    /// Read the string fields of a source object. Non-objects yield `None`.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let obj = value.as_object()?;
        let field = |key: &str| {
            obj.get(key)
                .and_then(JsonValue::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            title: field("title"),
            name: field("name"),
            url: field("url"),
            deep_link_url: field("deep_link_url"),
            text: obj
                .get("text")
                .and_then(JsonValue::as_str)
                .map(str::to_string),
        })
    }
}
