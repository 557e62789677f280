//! Chat message types.
//!
//! A `Message` is one entry in the ordered conversation list. User messages
//! carry plain text; assistant messages carry the raw envelope text returned
//! by the relay (decoded on render, never re-encoded).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the author of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed (or button-sent) by the user.
    User,
    /// Message produced by the virtual receptionist.
    Assistant,
}

/// A single message in the conversation history.
///
/// Immutable once appended to the conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    /// Plain text for user messages, serialized envelope text for assistant
    /// messages.
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a user message from the given utterance.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    /// Creates an assistant message wrapping raw envelope text.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text)
    }

    fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}
