//! Interaction layer: the Gemini REST client and the conversation relay.
//!
//! The relay is the single point of contact with the external model. It is
//! constructed with an explicit transport (dependency injection, no global
//! session handle) and normalizes every failure into a fallback envelope.

pub mod gemini_client;
pub mod prompt;
pub mod relay;
pub mod transport;

pub use gemini_client::GeminiClient;
pub use relay::{ChatRelay, connection_error_envelope, processing_problem_envelope};
pub use transport::{ChatTurn, ModelTransport, TransportError, TurnRole};
