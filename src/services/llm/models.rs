//! LLM Data Models
//!
//! Chat completion wire types and the completion error taxonomy.

use serde::{Deserialize, Serialize};

// ============================================================================
// Errors
// ============================================================================

/// LLM completion errors
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("API key not configured: set the {0} environment variable")]
    MissingCredential(String),

    #[error("LLM transport error: {0}")]
    Transport(String),

    #[error("LLM timeout after {0}s")]
    Timeout(u64),

    #[error("LLM API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("LLM response parsing error: {0}")]
    Decode(String),
}

impl CompletionError {
    /// Errors that mean no request could ever succeed in this run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingCredential(_))
    }
}

// ============================================================================
// OpenAI-compatible Request/Response Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    pub content: Option<String>,
}

/// Raw HTTP outcome handed back by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
