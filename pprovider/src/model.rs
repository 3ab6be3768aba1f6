//! Provider-agnostic request, response, and message model types.
//!
//! ```rust
//! use pprovider::{CompletionRequest, Message, Role};
//!
//! let ok = CompletionRequest::new_validated(
//!     "claude-3-5-haiku-20241022",
//!     vec![Message::new(Role::User, "Summarize this case")],
//!     1024,
//! );
//! assert!(ok.is_ok());
//!
//! let err = CompletionRequest::new_validated("", vec![Message::new(Role::User, "hi")], 1024)
//!     .err()
//!     .expect("empty model should fail");
//! assert_eq!(err.status, Some(400));
//! ```

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Raw model descriptor as returned by the provider's listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: String,
    pub display_name: Option<String>,
    pub created_at: Option<String>,
}

impl ModelInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputItem {
    Text(String),
    /// Output the relay cannot render, tagged with the wire-level block type.
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub model: String,
    pub output: Vec<OutputItem>,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Concatenated text output, or `None` when the response carried no text.
    pub fn text(&self) -> Option<String> {
        let mut collected = String::new();
        for item in &self.output {
            if let OutputItem::Text(text) = item {
                collected.push_str(text);
            }
        }

        if collected.is_empty() {
            None
        } else {
            Some(collected)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            system: None,
            messages,
            max_tokens,
        }
    }

    pub fn new_validated(
        model: impl Into<String>,
        messages: Vec<Message>,
        max_tokens: u32,
    ) -> Result<Self, ProviderError> {
        let request = Self::new(model, messages, max_tokens);
        request.validate()?;
        Ok(request)
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if self.max_tokens == 0 {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        Ok(())
    }
}
