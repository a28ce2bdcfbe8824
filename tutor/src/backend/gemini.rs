//! Google generative-language backend.
//!
//! Speaks the `models/{model}:generateContent` REST dialect; the system
//! instruction travels in its own field rather than as a message.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::http;
use super::traits::*;

/// Default endpoint for the public generative-language API.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Generative-language backend.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiBackend {
    /// Create a new backend against `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: http::json_client()?,
            base_url: http::trim_base(base_url),
            api_key: http::usable_key(api_key),
            model: model.into(),
        })
    }

    /// Create a backend for the public API.
    pub fn public(model: &str, api_key: Option<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_GEMINI_BASE_URL, model, api_key)
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    /// Absent when the prompt itself was blocked.
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

fn text_content(text: impl Into<String>, role: Option<&str>) -> Content {
    Content {
        role: role.map(String::from),
        parts: vec![Part {
            text: Some(text.into()),
        }],
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    fn id(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Unavailable("API key not configured".to_string()))?;

        let contents = request
            .messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "model",
                };
                text_content(msg.content.clone(), Some(role))
            })
            .collect();

        let generation_config = if request.max_tokens.is_some() || request.temperature.is_some() {
            Some(GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            })
        } else {
            None
        };

        let body = GenerateRequest {
            contents,
            system_instruction: request
                .system_prompt
                .as_ref()
                .map(|s| text_content(s.clone(), None)),
            generation_config,
        };

        let response = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let generated: GenerateResponse = http::decode(response).await?;

        let usage = generated
            .usage_metadata
            .map(|u| Usage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        let Some(candidate) = generated.candidates.into_iter().next() else {
            let block_reason = generated.prompt_feedback.and_then(|f| f.block_reason);
            warn!(model = %self.model, block_reason = ?block_reason, "Prompt produced no candidates");
            return Ok(CompletionResponse {
                content: String::new(),
                finish_reason: FinishReason::ContentFilter,
                usage,
            });
        };

        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            finish_reason: FinishReason::from_provider(candidate.finish_reason.as_deref()),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{AnswerKind, TutorBridge, EMPTY_ANSWER_MESSAGE};
    use crate::prompt::TutorContext;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend_for(server: &MockServer, key: Option<&str>) -> GeminiBackend {
        GeminiBackend::new(
            format!("{}/v1beta", server.uri()),
            "test-model",
            key.map(String::from),
        )
        .unwrap()
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let backend = GeminiBackend::public("gemini-3-flash-preview", Some("  ".to_string())).unwrap();
        assert!(!backend.is_configured());
        assert_eq!(backend.id(), "gemini-3-flash-preview");
    }

    #[tokio::test]
    async fn test_generate_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [{ "text": "persona" }] },
                "contents": [{ "role": "user", "parts": [{ "text": "Why is the leaf green?" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Chlorophyll " }, { "text": "reflects green." }] },
                    "finishReason": "STOP"
                }],
                "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 5 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server, Some("secret")).await;
        let response = backend
            .complete(CompletionRequest::user("Why is the leaf green?").with_system("persona"))
            .await
            .unwrap();

        assert_eq!(response.content, "Chlorophyll reflects green.");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage.total(), 17);
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let backend = backend_for(&server, Some("secret")).await;
        let result = backend.complete(CompletionRequest::user("Hi")).await;
        assert!(matches!(result, Err(LlmError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_retry_after_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let backend = backend_for(&server, Some("secret")).await;
        let result = backend.complete(CompletionRequest::user("Hi")).await;
        assert!(matches!(
            result,
            Err(LlmError::RateLimited { retry_after_ms: Some(7000) })
        ));
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_an_empty_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server, Some("secret")).await;
        let response = backend.complete(CompletionRequest::user("Hi")).await.unwrap();
        assert_eq!(response.content, "");
        assert_eq!(response.finish_reason, FinishReason::ContentFilter);

        let bridge = TutorBridge::new(Arc::new(backend));
        let (answer, kind) = bridge.ask_detailed("Hi", &TutorContext::new("light")).await;
        assert_eq!(kind, AnswerKind::Empty);
        assert_eq!(answer, EMPTY_ANSWER_MESSAGE);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let backend = backend_for(&server, Some("secret")).await;
        let result = backend.complete(CompletionRequest::user("Hi")).await;
        assert!(matches!(result, Err(LlmError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let backend = backend_for(&server, None).await;
        let result = backend.complete(CompletionRequest::user("Hi")).await;
        assert!(matches!(result, Err(LlmError::Unavailable(_))));
    }
}
