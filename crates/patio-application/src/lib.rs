//! Application layer: the presentation loop over the conversation.
//!
//! Composes the relay (through the `Receptionist` trait) with the ordered
//! message list, the at-most-one-in-flight guard, and the confirmation
//! notice. Front ends render the state this crate owns.

pub mod controller;
pub mod toast;

pub use controller::{ChatController, OptionOutcome, SendOutcome};
pub use toast::ConfirmationToast;
