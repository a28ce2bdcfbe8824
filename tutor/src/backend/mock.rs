//! Mock backend for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::traits::*;

/// What the mock does when `complete` is called.
#[derive(Debug, Clone)]
enum MockBehavior {
    Respond(String),
    Fail(MockFailure),
}

/// Failure kinds the mock can simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Network,
    Malformed,
    RateLimited,
}

/// Mock backend for testing.
///
/// Counts calls so tests can assert whether the bridge reached the network.
pub struct MockBackend {
    model_id: String,
    configured: AtomicBool,
    behavior: MockBehavior,
    delay: Option<Duration>,
    call_count: AtomicU32,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            configured: AtomicBool::new(true),
            behavior: MockBehavior::Respond("Mock response".to_string()),
            delay: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Set the response content.
    pub fn with_response(mut self, content: impl Into<String>) -> Self {
        self.behavior = MockBehavior::Respond(content.into());
        self
    }

    /// Make every call fail.
    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        self.behavior = MockBehavior::Fail(failure);
        self
    }

    /// Pretend the credential is missing.
    pub fn without_credential(self) -> Self {
        self.configured.store(false, Ordering::SeqCst);
        self
    }

    /// Hold each call open for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times complete was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent request seen by `complete`.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    fn is_configured(&self) -> bool {
        self.configured.load(Ordering::SeqCst)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let prompt_tokens: u32 = request
            .messages
            .iter()
            .map(|m| m.content.len() as u32 / 4)
            .sum();

        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            MockBehavior::Respond(content) => Ok(CompletionResponse {
                content: content.clone(),
                finish_reason: FinishReason::Stop,
                usage: Usage {
                    prompt_tokens,
                    completion_tokens: content.len() as u32 / 4,
                },
            }),
            MockBehavior::Fail(MockFailure::Network) => {
                Err(LlmError::NetworkError("connection refused".to_string()))
            }
            MockBehavior::Fail(MockFailure::Malformed) => {
                Err(LlmError::ParseError("unexpected end of input".to_string()))
            }
            MockBehavior::Fail(MockFailure::RateLimited) => {
                Err(LlmError::RateLimited { retry_after_ms: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend() {
        let backend = MockBackend::new("test-model").with_response("Hello, world!");

        assert!(backend.is_configured());
        assert_eq!(backend.call_count(), 0);

        let response = backend
            .complete(CompletionRequest::user("Hi"))
            .await
            .unwrap();

        assert_eq!(response.content, "Hello, world!");
        assert_eq!(backend.call_count(), 1);
        assert!(backend.last_request().is_some());
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let backend = MockBackend::default().with_failure(MockFailure::Network);

        let result = backend.complete(CompletionRequest::user("Hi")).await;
        assert!(matches!(result, Err(LlmError::NetworkError(_))));
        assert_eq!(backend.call_count(), 1);
    }
}
