//! Presentation loop: the ordered conversation state machine.
//!
//! Owns the append-only message list and the loading flag. At most one send
//! may be in flight; a second attempt while one is outstanding is silently
//! dropped, never queued. The user message is appended optimistically before
//! the relay round-trip settles.

use std::sync::Arc;

use patio_core::envelope::{
    ChatOption, DecodeOutcome, EnvelopeStatus, OptionKind, ResponseEnvelope, decode_envelope,
};
use patio_core::message::{Message, MessageRole};
use patio_core::receptionist::Receptionist;
use tokio::sync::RwLock;
use tracing::debug;

use crate::toast::ConfirmationToast;

/// Result of submitting an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Dropped by the guard: empty text, or a send already in flight.
    Ignored,
    /// The relay settled; the decoded assistant envelope.
    Replied(ResponseEnvelope),
}

/// Result of activating an option button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionOutcome {
    /// Link/call option: open the target externally, nothing appended.
    OpenExternal(String),
    /// Message option: resent as user input, relay settled.
    Replied(ResponseEnvelope),
    /// Message option dropped by the send guard.
    Ignored,
}

struct ChatState {
    messages: Vec<Message>,
    is_loading: bool,
}

/// Drives the conversation: appends messages, invokes the relay, and
/// schedules the confirmation notice on a confirmed booking.
#[derive(Clone)]
pub struct ChatController {
    receptionist: Arc<dyn Receptionist>,
    state: Arc<RwLock<ChatState>>,
    toast: ConfirmationToast,
}

impl ChatController {
    pub fn new(receptionist: Arc<dyn Receptionist>) -> Self {
        Self {
            receptionist,
            state: Arc::new(RwLock::new(ChatState {
                messages: Vec::new(),
                is_loading: false,
            })),
            toast: ConfirmationToast::new(),
        }
    }

    /// Appends the canned greeting as the first assistant turn.
    pub async fn seed_welcome(&self, envelope: &ResponseEnvelope) {
        let mut state = self.state.write().await;
        state
            .messages
            .push(Message::assistant(envelope.to_json_text()));
    }

    /// Snapshot of the conversation, in insertion (chronological) order.
    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.messages.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub fn toast(&self) -> &ConfirmationToast {
        &self.toast
    }

    /// The envelope of the most recent assistant turn, if any.
    pub async fn last_envelope(&self) -> Option<ResponseEnvelope> {
        let state = self.state.read().await;
        state
            .messages
            .iter()
            .rev()
            .find(|message| message.role == MessageRole::Assistant)
            .map(|message| decode_envelope(&message.text).into_envelope())
    }

    /// Submits one utterance.
    ///
    /// Guarded: empty text and sends-while-loading are ignored. Otherwise
    /// appends the user message, awaits the relay (which never fails), and
    /// appends exactly one assistant message.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        {
            let mut state = self.state.write().await;
            if state.is_loading {
                debug!("send dropped: a request is already in flight");
                return SendOutcome::Ignored;
            }
            state.is_loading = true;
            state.messages.push(Message::user(text));
        }

        // Lock released while the relay call is in flight so observers can
        // read the optimistic user message and the loading flag.
        let raw = self.receptionist.send(text).await;

        let (stored_text, envelope) = match decode_envelope(&raw) {
            DecodeOutcome::Structured(envelope) => (raw, envelope),
            DecodeOutcome::Malformed { raw } => {
                debug!("assistant reply was not a structured envelope");
                let envelope = ResponseEnvelope::fallback(raw);
                (envelope.to_json_text(), envelope)
            }
        };

        {
            let mut state = self.state.write().await;
            state.messages.push(Message::assistant(stored_text));
            state.is_loading = false;
        }

        if envelope.status == EnvelopeStatus::Confirmed {
            self.toast.schedule();
        }

        SendOutcome::Replied(envelope)
    }

    /// Activates an option button.
    ///
    /// Link/call options open their value externally and never touch the
    /// conversation; message options behave exactly like a typed send of
    /// the option's value.
    pub async fn activate_option(&self, option: &ChatOption) -> OptionOutcome {
        match option.kind {
            OptionKind::Link | OptionKind::Call => OptionOutcome::OpenExternal(option.value.clone()),
            OptionKind::Message => match self.send(&option.value).await {
                SendOutcome::Replied(envelope) => OptionOutcome::Replied(envelope),
                SendOutcome::Ignored => OptionOutcome::Ignored,
            },
        }
    }
}
