//! Domain types for the Patio Funes virtual receptionist.
//!
//! This crate holds everything the other layers share: the conversation
//! message model, the response envelope and its decoder, configuration, the
//! application error type, and the trait the presentation loop uses to talk
//! to the relay.

pub mod config;
pub mod envelope;
pub mod error;
pub mod message;
pub mod receptionist;

// Re-export common error type
pub use error::{PatioError, Result};

pub use envelope::{
    ChatOption, DecodeOutcome, EnvelopeStatus, OptionKind, ResponseEnvelope, decode_envelope,
};
pub use message::{Message, MessageRole};
pub use receptionist::Receptionist;
