//! Append-only conversation log for one tutor session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::traits::MessageRole;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// One entry in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ConversationMessage {
    /// Unique message ID
    pub id: String,
    /// Who said it
    pub role: MessageRole,
    /// Message text
    pub content: String,
    /// When it was appended
    #[cfg_attr(feature = "typescript", ts(type = "string"))]
    pub at: DateTime<Utc>,
}

impl ConversationMessage {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// Ordered, append-only message log. Dropped with its session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationLog {
    messages: Vec<ConversationMessage>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a log with an assistant greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut log = Self::new();
        log.push_assistant(greeting);
        log
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> &ConversationMessage {
        self.push(ConversationMessage::new(MessageRole::User, content))
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> &ConversationMessage {
        self.push(ConversationMessage::new(MessageRole::Assistant, content))
    }

    fn push(&mut self, message: ConversationMessage) -> &ConversationMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_keeps_order() {
        let mut log = ConversationLog::with_greeting("hello");
        log.push_user("what is NADPH?");
        log.push_assistant("a reduced electron carrier");

        let roles: Vec<_> = log.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::Assistant, MessageRole::User, MessageRole::Assistant]
        );
        assert_eq!(log.last().unwrap().content, "a reduced electron carrier");
        assert_ne!(log.messages()[0].id, log.messages()[1].id);
    }
}
