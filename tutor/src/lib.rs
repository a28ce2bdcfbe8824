//! Tutor - question answering for the photosynthesis lab
//!
//! Forwards learner questions to an external text-generation service:
//! - Trait-based backends (Gemini, OpenAI-compatible, mock)
//! - System instruction assembled from a persona and the asking screen's tag
//! - Failures folded into fixed user-facing messages, never propagated
//! - Sessions with an append-only log and an in-flight guard
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            TutorSession                 │
//! │   (conversation log, in-flight guard)   │
//! └────────────────┬────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │            TutorBridge                  │
//! │   (credential check, prompt, fallback)  │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │   Gemini    │       │   OpenAI-   │
//! │   Backend   │       │ compatible  │
//! └─────────────┘       └─────────────┘
//! ```

pub mod backend;
pub mod bridge;
pub mod config;
pub mod conversation;
pub mod prompt;
pub mod session;

// Re-export main types for convenience
pub use backend::traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError, MessageRole};
pub use bridge::{AnswerKind, TutorBridge};
pub use config::{Provider, TutorConfig};
pub use conversation::{ConversationLog, ConversationMessage};
pub use prompt::{PromptAssembler, TutorContext, COMPARISON_CONTEXT};
pub use session::{SessionError, TutorSession};
