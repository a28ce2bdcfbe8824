//! Tutor backend abstraction layer.
//!
//! Provides a trait-based interface over text-generation providers:
//! - Google generative-language (Gemini)
//! - OpenAI-compatible (OpenAI, vLLM, Ollama, etc.)
//! - Mock backend for testing

pub mod gemini;
mod http;
pub mod mock;
pub mod openai;
pub mod traits;

pub use gemini::GeminiBackend;
pub use mock::{MockBackend, MockFailure};
pub use openai::OpenAiBackend;
pub use traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
