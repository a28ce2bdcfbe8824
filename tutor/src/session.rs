//! TutorSession - the conversation panel's state.
//!
//! Holds the log and refuses a second question while one is in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::bridge::TutorBridge;
use crate::conversation::{ConversationLog, ConversationMessage};
use crate::prompt::TutorContext;

/// First assistant message of every session.
pub const GREETING: &str = "Hi! I'm your photosynthesis tutor. Is there anything about the \
process you don't understand yet? For example \"what is photorespiration\" or \"why are C4 \
plants better suited to heat\"?";

/// Why a question was not sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Blank input
    #[error("Question is empty")]
    EmptyQuestion,

    /// Another question has not been answered yet
    #[error("A question is already being answered")]
    Busy,
}

/// Clears the in-flight flag when the request future completes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One tutor conversation.
pub struct TutorSession {
    session_id: String,
    bridge: Arc<TutorBridge>,
    log: RwLock<ConversationLog>,
    in_flight: AtomicBool,
}

impl TutorSession {
    /// Open a session, seeded with the greeting.
    pub fn new(bridge: Arc<TutorBridge>) -> Self {
        let session_id = uuid::Uuid::new_v4().to_string();
        info!(session_id = %session_id, "Tutor session opened");
        Self {
            session_id,
            bridge,
            log: RwLock::new(ConversationLog::with_greeting(GREETING)),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.session_id
    }

    /// Whether the credential notice should be shown.
    pub fn is_configured(&self) -> bool {
        self.bridge.is_configured()
    }

    /// Whether a question is awaiting its answer.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Snapshot of the conversation so far.
    pub async fn messages(&self) -> Vec<ConversationMessage> {
        self.log.read().await.messages().to_vec()
    }

    /// Send a question and append both sides to the log.
    pub async fn send(&self, question: &str, context: &TutorContext) -> Result<String, SessionError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(session_id = %self.session_id, "Question refused while another is pending");
            return Err(SessionError::Busy);
        }
        let _guard = InFlight(&self.in_flight);

        self.log.write().await.push_user(question);

        let answer = self.bridge.ask(question, context).await;

        self.log.write().await.push_assistant(answer.clone());
        Ok(answer)
    }
}
