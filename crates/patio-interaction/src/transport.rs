//! Transport abstraction over the generative-language service.
//!
//! The relay talks to the model through [`ModelTransport`] so that tests can
//! substitute a scripted implementation and the HTTP client stays swappable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One turn of conversation history sent with every request.
///
/// The REST API is stateless, so the relay carries the history itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

/// Roles the Gemini API accepts in `contents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Failures the transport can report to the relay.
///
/// Never escapes the relay: every variant is normalized into a fallback
/// envelope there.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The HTTP request itself failed (connect, DNS, TLS, body read).
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body did not match the expected wire shape.
    #[error("failed to decode service response: {0}")]
    Decode(String),
}

/// A request/response channel to the external model.
///
/// Returns the model's reply text. A successful call with no usable text
/// yields `Ok` with an empty string; the relay decides how to degrade it.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn generate(&self, history: &[ChatTurn]) -> Result<String, TransportError>;
}
