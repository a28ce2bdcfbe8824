//! Core traits for tutor backends.
//!
//! This module defines the `LlmBackend` trait - the single network seam the
//! tutor bridge talks through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Error types for backend operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Backend cannot be used (missing credential, client construction failed)
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request failed with a non-success status
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Rate limited by the backend
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Core trait for text-generation backends.
///
/// Implementations own their credential; the bridge asks `is_configured`
/// before ever calling `complete`.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Get the backend identifier (the model name).
    fn id(&self) -> &str;

    /// Whether a credential is present. No network access.
    fn is_configured(&self) -> bool;

    /// Generate a completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Request for a completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CompletionRequest {
    /// System instruction (persona + context)
    pub system_prompt: Option<String>,
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature (0.0-2.0)
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Create a new request with a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(content)],
            ..Default::default()
        }
    }

    /// Add a system prompt.
    pub fn with_system(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max: Option<u32>) -> Self {
        self.max_tokens = max;
        self
    }
}

/// A message sent to a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Response from a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CompletionResponse {
    /// Generated text, possibly empty
    pub content: String,
    /// Why generation stopped
    pub finish_reason: FinishReason,
    /// Token usage
    pub usage: Usage,
}

/// Why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop
    Stop,
    /// Hit max tokens limit
    Length,
    /// Content was filtered
    ContentFilter,
}

impl FinishReason {
    /// Map a provider finish string (either dialect) onto a reason.
    pub fn from_provider(reason: Option<&str>) -> Self {
        match reason {
            Some("length") | Some("MAX_TOKENS") => FinishReason::Length,
            Some("content_filter") | Some("SAFETY") | Some("BLOCKLIST") => {
                FinishReason::ContentFilter
            }
            _ => FinishReason::Stop,
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the completion
    pub completion_tokens: u32,
}

impl Usage {
    /// Get total tokens. Provider counts are untrusted, so this saturates.
    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::user("What is photorespiration?")
            .with_system("persona")
            .with_max_tokens(Some(512));

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.system_prompt.as_deref(), Some("persona"));
        assert_eq!(request.temperature, None);
        assert_eq!(request.max_tokens, Some(512));
    }

    #[test]
    fn test_usage_total_saturates() {
        let usage = Usage {
            prompt_tokens: u32::MAX,
            completion_tokens: 1,
        };
        assert_eq!(usage.total(), u32::MAX);
        assert_eq!(Usage { prompt_tokens: 12, completion_tokens: 5 }.total(), 17);
    }

    #[test]
    fn test_finish_reason_dialects() {
        assert_eq!(FinishReason::from_provider(Some("MAX_TOKENS")), FinishReason::Length);
        assert_eq!(FinishReason::from_provider(Some("length")), FinishReason::Length);
        assert_eq!(FinishReason::from_provider(Some("SAFETY")), FinishReason::ContentFilter);
        assert_eq!(FinishReason::from_provider(Some("STOP")), FinishReason::Stop);
        assert_eq!(FinishReason::from_provider(None), FinishReason::Stop);
    }
}
