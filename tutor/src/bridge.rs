//! TutorBridge - single request/response hop to the text-generation backend.
//!
//! `ask` never fails: every failure is folded into a fixed user-facing string
//! and logged. No retry, no cache, no timeout beyond the transport's own.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::backend::traits::{CompletionRequest, LlmBackend, LlmError};
use crate::backend::{GeminiBackend, OpenAiBackend};
use crate::config::{Provider, TutorConfig};
use crate::prompt::{PromptAssembler, TutorContext};

/// Returned without a network call when no credential is configured.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "The API key is not configured, so the AI tutor is unavailable.";

/// Returned when the backend answers with no text.
pub const EMPTY_ANSWER_MESSAGE: &str = "Sorry, I can't answer that question right now.";

/// Returned on any transport or parse failure.
pub const OFFLINE_MESSAGE: &str =
    "The AI tutor is temporarily offline. Please check your API key or network connection.";

/// Outcome category of one `ask`, for callers that want more than the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    Answered,
    Empty,
    NotConfigured,
    Failed,
}

/// Wraps one backend and turns questions into answers.
pub struct TutorBridge {
    backend: Arc<dyn LlmBackend>,
    response_language: String,
    max_output_tokens: Option<u32>,
}

impl TutorBridge {
    /// Create a bridge over an existing backend.
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        let defaults = TutorConfig::default();
        Self {
            backend,
            response_language: defaults.response_language,
            max_output_tokens: defaults.max_output_tokens,
        }
    }

    /// Build the backend named by `config`.
    pub fn from_config(config: &TutorConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone();
        let backend: Arc<dyn LlmBackend> = match config.provider {
            Provider::Gemini => Arc::new(match &config.base_url {
                Some(url) => GeminiBackend::new(url.clone(), config.model.clone(), api_key)?,
                None => GeminiBackend::public(&config.model, api_key)?,
            }),
            Provider::OpenAi => Arc::new(OpenAiBackend::new(
                config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| crate::backend::openai::DEFAULT_OPENAI_BASE_URL.to_string()),
                config.model.clone(),
                api_key,
            )?),
        };

        info!(
            provider = ?config.provider,
            model = %config.model,
            configured = backend.is_configured(),
            "Tutor bridge ready"
        );

        Ok(Self {
            backend,
            response_language: config.response_language.clone(),
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Set the answer language.
    pub fn with_response_language(mut self, language: impl Into<String>) -> Self {
        self.response_language = language.into();
        self
    }

    /// Whether questions will reach the network at all.
    pub fn is_configured(&self) -> bool {
        self.backend.is_configured()
    }

    /// Model identifier of the wrapped backend.
    pub fn model(&self) -> &str {
        self.backend.id()
    }

    /// Ask a question; always yields displayable text.
    pub async fn ask(&self, question: &str, context: &TutorContext) -> String {
        self.ask_detailed(question, context).await.0
    }

    /// Like [`ask`](Self::ask) but also reports which path produced the text.
    pub async fn ask_detailed(&self, question: &str, context: &TutorContext) -> (String, AnswerKind) {
        if !self.backend.is_configured() {
            warn!(context = %context, "Tutor question dropped: no credential configured");
            return (NOT_CONFIGURED_MESSAGE.to_string(), AnswerKind::NotConfigured);
        }

        let request = CompletionRequest::user(question)
            .with_system(PromptAssembler::system_instruction(context, &self.response_language))
            .with_max_tokens(self.max_output_tokens);

        debug!(
            model = %self.backend.id(),
            context = %context,
            question_len = question.len(),
            "Forwarding tutor question"
        );

        match self.backend.complete(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                debug!(
                    finish_reason = ?response.finish_reason,
                    tokens = response.usage.total(),
                    "Tutor answered"
                );
                (response.content, AnswerKind::Answered)
            }
            Ok(_) => {
                warn!(model = %self.backend.id(), "Tutor backend returned no text");
                (EMPTY_ANSWER_MESSAGE.to_string(), AnswerKind::Empty)
            }
            Err(e) => {
                error!(model = %self.backend.id(), error = %e, "Tutor backend error");
                (OFFLINE_MESSAGE.to_string(), AnswerKind::Failed)
            }
        }
    }
}
