//! Chat completion service contract
//!
//! The assistant consults the completion service at most once per query.
//! [`CompletionOutcome`] keeps the four ways that call can end apart so the
//! caller decides how each is worded.


pub mod openai;

pub use openai::OpenAiClient;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[inline]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[inline]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// `choices[0].message.content` of a well-formed response
    Completed(String),
    /// The service answered with an `error` body
    ServiceError(String),
    /// Any other body, verbatim
    Unexpected(String),
    /// Connection failure, timeout or unreadable body
    Transport(String),
}

/// Grounding instructions sent ahead of every question
pub const SYSTEM_PROMPT: &str = "You are the PartSelect AI assistant. You MUST answer ONLY using the \
provided part context. If the part exists in context, describe it accurately. If not in context, \
say: 'No matching part found.' NEVER invent part numbers, features, brands, or models.";

/// System prompt plus one user turn carrying the context and the question
#[inline]
pub fn build_messages(context: &str, query: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "CONTEXT:\n{}\n\nUSER QUESTION:\n{}",
            context, query
        )),
    ]
}

/// Single-attempt chat completion. Implementations block until the service
/// answers or their timeout expires and never retry.
pub trait CompletionClient: Send + Sync {
    fn complete(&self, messages: &[ChatMessage]) -> CompletionOutcome;
}

/// Classify a response body by its shape, independent of the HTTP status
#[inline]
pub fn interpret_response(body: &str) -> CompletionOutcome {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return CompletionOutcome::Unexpected(body.to_string());
    };

    if let Some(choices) = value.get("choices") {
        return choices
            .get(0)
            .and_then(|choice| choice.pointer("/message/content"))
            .and_then(Value::as_str)
            .map_or_else(
                || CompletionOutcome::Unexpected(value.to_string()),
                |content| CompletionOutcome::Completed(content.to_string()),
            );
    }

    if let Some(error) = value.get("error") {
        let message = match error {
            Value::String(message) => message.clone(),
            Value::Object(fields) => fields
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| error.to_string(), str::to_string),
            other => other.to_string(),
        };
        return CompletionOutcome::ServiceError(message);
    }

    CompletionOutcome::Unexpected(value.to_string())
}
