use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::services::memory::{Entry, UserId};

// ===== SHARED TYPES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Message as sent to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

impl From<&Entry> for ChatMessage {
    fn from(entry: &Entry) -> Self {
        Self::new(entry.role(), entry.content())
    }
}

// ===== REQUEST MODELS =====

/// Body of `POST /mukoma-ai` as it arrives on the wire.
/// Fields stay untyped until [`ChatTurnRequest::try_from`] validates them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub persona: Option<Value>,
    #[serde(default)]
    pub language: Option<Value>,
    #[serde(default)]
    pub user_id: Option<Value>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("message must be a non-empty string")]
    InvalidMessage,
}

/// Validated chat turn
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurnRequest {
    pub message: String,
    pub persona: Option<String>,
    pub language: Option<String>,
    pub user_id: UserId,
}

impl TryFrom<ChatRequest> for ChatTurnRequest {
    type Error = ValidationError;

    fn try_from(raw: ChatRequest) -> Result<Self, Self::Error> {
        let message = match raw.message {
            Some(Value::String(text)) if !text.is_empty() => text,
            _ => return Err(ValidationError::InvalidMessage),
        };

        let user_id = user_key(raw.user_id);

        Ok(Self {
            message,
            persona: text_field(raw.persona),
            language: text_field(raw.language),
            user_id: UserId::normalize(user_id.as_deref()),
        })
    }
}

/// Keep optional fields only when they are non-empty strings
fn text_field(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) if !text.is_empty() => Some(text),
        _ => None,
    }
}

/// Scalar ids become their string form (`1` -> `"1"`), so numeric ids keep
/// separate histories. Anything else falls back to anonymous.
fn user_key(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        other => text_field(other),
    }
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub success: bool,
    pub reply: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryResponse {
    pub success: bool,
    pub user_id: String,
    pub conversation: Vec<Entry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearMemoryResponse {
    pub success: bool,
    pub user_id: String,
}
