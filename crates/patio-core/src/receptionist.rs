//! Trait seam between the presentation loop and the relay.
//!
//! Lives in the core crate so the application layer can depend on the
//! abstraction without a crate cycle; the interaction crate provides the
//! real implementation.

use async_trait::async_trait;

/// The single channel to the external generative service.
///
/// `send` always resolves with envelope text: implementations normalize
/// every failure (timeout, transport, empty reply) into a canonical
/// fallback envelope before returning, so callers never handle errors.
#[async_trait]
pub trait Receptionist: Send + Sync {
    /// Forwards one user utterance and returns raw envelope text.
    async fn send(&self, utterance: &str) -> String;
}
