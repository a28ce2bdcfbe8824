//! Chat-completions backend for OpenAI and compatible servers (vLLM, Ollama).

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use super::http;
use super::traits::*;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiBackend {
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
}

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    choices: Vec<ReplyChoice>,
    usage: Option<ReplyUsage>,
}

#[derive(Debug, Deserialize)]
struct ReplyChoice {
    message: ReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

fn wire_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn id(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(LlmError::Unavailable("API key not configured".to_string()));
        };

        // The system prompt rides as the leading message in this dialect.
        let system = request.system_prompt.as_deref().map(|content| WireMessage {
            role: "system",
            content,
        });
        let turns = request.messages.iter().map(|m| WireMessage {
            role: wire_role(m.role),
            content: &m.content,
        });

        let body = ChatBody {
            model: &self.model,
            messages: system.into_iter().chain(turns).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let reply: ChatReply = http::decode(response).await?;
        let Some(choice) = reply.choices.into_iter().next() else {
            return Err(LlmError::ParseError("reply had no choices".to_string()));
        };

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            finish_reason: FinishReason::from_provider(choice.finish_reason.as_deref()),
            usage: reply
                .usage
                .map(|u| Usage {
                    prompt_tokens: u.prompt_tokens,
                    completion_tokens: u.completion_tokens,
                })
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_chat_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "llama3.2",
                "messages": [
                    { "role": "system", "content": "persona" },
                    { "role": "user", "content": "What does PEPC do?" }
                ],
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": { "content": "It fixes bicarbonate." },
                    "finish_reason": "length"
                }],
                "usage": { "prompt_tokens": 20, "completion_tokens": 4 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(
            format!("{}/v1/", server.uri()),
            "llama3.2",
            Some("sk-test".to_string()),
        )
        .unwrap();

        let response = backend
            .complete(CompletionRequest::user("What does PEPC do?").with_system("persona"))
            .await
            .unwrap();

        assert_eq!(response.content, "It fixes bicarbonate.");
        assert_eq!(response.finish_reason, FinishReason::Length);
        assert_eq!(response.usage.prompt_tokens, 20);
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let backend =
            OpenAiBackend::new(server.uri(), "llama3.2", Some("sk-test".to_string())).unwrap();
        let result = backend.complete(CompletionRequest::user("Hi")).await;

        match result {
            Err(LlmError::RequestFailed(msg)) => assert!(msg.contains("overloaded")),
            other => panic!("expected RequestFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let backend =
            OpenAiBackend::new(server.uri(), "llama3.2", Some("sk-test".to_string())).unwrap();
        let result = backend.complete(CompletionRequest::user("Hi")).await;
        assert!(matches!(result, Err(LlmError::ParseError(_))));
    }
}
