//! Serde types for the Anthropic messages and model-listing endpoints.

use serde::{Deserialize, Serialize};

use crate::{ErrorType, ModelInfo, OutputItem, TokenUsage};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<WireMessage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessagesResponse {
    pub model: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub usage: WireUsage,
}

impl MessagesResponse {
    pub fn into_output(self) -> (String, Vec<OutputItem>, TokenUsage) {
        let output = self
            .content
            .into_iter()
            .map(|block| match block.text {
                Some(text) if block.block_type == "text" => OutputItem::Text(text),
                _ => OutputItem::Unsupported(block.block_type),
            })
            .collect();

        let usage = TokenUsage {
            input_tokens: self.usage.input_tokens,
            output_tokens: self.usage.output_tokens,
        };

        (self.model, output, usage)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelsPage {
    #[serde(default)]
    pub data: Vec<ModelEntry>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub last_id: Option<String>,
}

impl From<ModelEntry> for ModelInfo {
    fn from(entry: ModelEntry) -> Self {
        Self {
            id: entry.id,
            display_name: entry.display_name,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Pulls the structured type and message out of an error body, when the
/// body is the documented error envelope.
pub fn extract_error(body: &str) -> (Option<ErrorType>, Option<String>) {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return (None, None);
    };

    let error_type = envelope
        .error
        .error_type
        .as_deref()
        .and_then(ErrorType::from_wire);

    (error_type, envelope.error.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_request_serializes_without_empty_system() {
        let request = MessagesRequest {
            model: "claude-3-5-haiku-20241022".to_string(),
            max_tokens: 1024,
            system: None,
            messages: vec![WireMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
        };

        let json = serde_json::to_value(&request).expect("serialize request");
        assert!(json.get("system").is_none());
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn messages_response_maps_text_and_unsupported_blocks() {
        let body = r#"{
            "model": "claude-3-5-haiku-20241022",
            "content": [
                {"type": "text", "text": "hi there"},
                {"type": "tool_use"}
            ],
            "usage": {"input_tokens": 12, "output_tokens": 5}
        }"#;

        let response: MessagesResponse = serde_json::from_str(body).expect("parse response");
        let (model, output, usage) = response.into_output();

        assert_eq!(model, "claude-3-5-haiku-20241022");
        assert_eq!(output[0], OutputItem::Text("hi there".to_string()));
        assert_eq!(output[1], OutputItem::Unsupported("tool_use".to_string()));
        assert_eq!(usage.input_tokens, 12);
        assert_eq!(usage.output_tokens, 5);
    }

    #[test]
    fn models_page_parses_entries() {
        let body = r#"{
            "data": [
                {"id": "claude-3-5-haiku-20241022", "display_name": "Claude Haiku 3.5", "created_at": "2024-10-22T00:00:00Z"},
                {"id": "claude-sonnet-4-20250514"}
            ],
            "has_more": false
        }"#;

        let page: ModelsPage = serde_json::from_str(body).expect("parse page");
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].id, "claude-3-5-haiku-20241022");
        assert_eq!(page.data[1].display_name, None);
        assert!(!page.has_more);
    }

    #[test]
    fn extract_error_reads_the_documented_envelope() {
        let body = r#"{"type": "error", "error": {"type": "not_found_error", "message": "model: nope"}}"#;
        let (error_type, message) = extract_error(body);

        assert_eq!(error_type, Some(ErrorType::NotFound));
        assert_eq!(message.as_deref(), Some("model: nope"));
    }

    #[test]
    fn extract_error_tolerates_unknown_bodies() {
        assert_eq!(extract_error("not json"), (None, None));
        assert_eq!(extract_error(r#"{"error": {"type": "mystery_error"}}"#).0, None);
    }
}
