//! Conversation relay: the single channel between the chat loop and the
//! external model.
//!
//! Every call is raced against a fixed deadline, and every failure path
//! (timeout, transport error, empty reply) is normalized into a canonical
//! fallback envelope, so `send` always resolves with envelope text.

use std::time::Duration;

use async_trait::async_trait;
use patio_core::Receptionist;
use patio_core::envelope::{ChatOption, EnvelopeStatus, ResponseEnvelope};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::transport::{ChatTurn, ModelTransport};

/// Relay holding one logical session to the external model.
///
/// The session history is created lazily on first use; `initialize` replaces
/// it wholesale, which doubles as a full conversation reset.
pub struct ChatRelay<T: ModelTransport> {
    transport: T,
    deadline: Duration,
    history: Mutex<Option<Vec<ChatTurn>>>,
}

impl<T: ModelTransport> ChatRelay<T> {
    pub fn new(transport: T, deadline: Duration) -> Self {
        Self {
            transport,
            deadline,
            history: Mutex::new(None),
        }
    }

    /// Creates (or replaces) the session history. Idempotent.
    pub async fn initialize(&self) {
        *self.history.lock().await = Some(Vec::new());
    }

    /// Forwards one utterance and returns raw envelope text.
    ///
    /// Never fails: timeouts and transport errors resolve to the canonical
    /// connection-error envelope (whose single retry option echoes the
    /// utterance verbatim), an empty model reply resolves to the canonical
    /// processing-problem envelope.
    pub async fn send(&self, utterance: &str) -> String {
        let mut guard = self.history.lock().await;
        // Self-healing: a send before initialize creates the session.
        let history = guard.get_or_insert_with(Vec::new);
        history.push(ChatTurn::user(utterance));

        let outcome = tokio::time::timeout(self.deadline, self.transport.generate(history)).await;

        match outcome {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                history.push(ChatTurn::model(text.clone()));
                debug!(turns = history.len(), "model reply received");
                text
            }
            Ok(Ok(_)) => {
                warn!("model returned an empty reply");
                history.pop();
                processing_problem_envelope().to_json_text()
            }
            Ok(Err(err)) => {
                warn!(error = %err, "transport failure");
                history.pop();
                connection_error_envelope(utterance).to_json_text()
            }
            // Deadline won the race; the in-flight call was dropped with it
            // and its eventual result is discarded.
            Err(_elapsed) => {
                warn!(deadline_ms = self.deadline.as_millis() as u64, "model call timed out");
                history.pop();
                connection_error_envelope(utterance).to_json_text()
            }
        }
    }
}

#[async_trait]
impl<T: ModelTransport> Receptionist for ChatRelay<T> {
    async fn send(&self, utterance: &str) -> String {
        ChatRelay::send(self, utterance).await
    }
}

/// Envelope returned when the service succeeded but produced no usable text.
/// Offers a single restart option.
pub fn processing_problem_envelope() -> ResponseEnvelope {
    ResponseEnvelope {
        message: "Lo siento, tuve un problema procesando tu solicitud.".to_string(),
        options: vec![ChatOption::message("Reiniciar", "Hola")],
        status: EnvelopeStatus::Unknown,
        reservation_details: None,
    }
}

/// Envelope returned on timeout or transport failure. The retry option
/// echoes the failed utterance so the user can resend it verbatim.
pub fn connection_error_envelope(utterance: &str) -> ResponseEnvelope {
    ResponseEnvelope {
        message: "Hubo un error de conexión o demora. Por favor intenta responder nuevamente."
            .to_string(),
        options: vec![ChatOption::message("Reintentar último mensaje", utterance)],
        status: EnvelopeStatus::Unknown,
        reservation_details: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{TransportError, TurnRole};
    use patio_core::decode_envelope;
    use patio_core::envelope::OptionKind;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex as AsyncMutex;

    /// Scripted transport: pops the next behavior per call and records the
    /// history it was handed.
    struct ScriptedTransport {
        script: AsyncMutex<Vec<Behavior>>,
        calls: AtomicUsize,
        seen_turns: AsyncMutex<Vec<Vec<ChatTurn>>>,
    }

    enum Behavior {
        Reply(String),
        Empty,
        Fail,
        Hang,
    }

    impl ScriptedTransport {
        fn new(mut script: Vec<Behavior>) -> Arc<Self> {
            script.reverse();
            Arc::new(Self {
                script: AsyncMutex::new(script),
                calls: AtomicUsize::new(0),
                seen_turns: AsyncMutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelTransport for Arc<ScriptedTransport> {
        async fn generate(&self, history: &[ChatTurn]) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_turns.lock().await.push(history.to_vec());
            match self.script.lock().await.pop() {
                Some(Behavior::Reply(text)) => Ok(text),
                Some(Behavior::Empty) => Ok(String::new()),
                Some(Behavior::Fail) => {
                    Err(TransportError::Request("connection refused".to_string()))
                }
                Some(Behavior::Hang) | None => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        }
    }

    fn relay(script: Vec<Behavior>) -> (ChatRelay<Arc<ScriptedTransport>>, Arc<ScriptedTransport>) {
        let transport = ScriptedTransport::new(script);
        (
            ChatRelay::new(transport.clone(), Duration::from_millis(15_000)),
            transport,
        )
    }

    #[tokio::test]
    async fn test_successful_reply_is_returned_verbatim() {
        let reply = r#"{"message":"hola","status":"ongoing","options":[]}"#;
        let (relay, _) = relay(vec![Behavior::Reply(reply.to_string())]);
        assert_eq!(relay.send("Hola").await, reply);
    }

    #[tokio::test]
    async fn test_send_self_heals_without_initialize() {
        let (relay, transport) = relay(vec![Behavior::Reply("{}".to_string())]);
        relay.send("Hola").await;
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_history_accumulates_across_turns() {
        let (relay, transport) = relay(vec![
            Behavior::Reply("r1".to_string()),
            Behavior::Reply("r2".to_string()),
        ]);
        relay.initialize().await;
        relay.send("primero").await;
        relay.send("segundo").await;

        let seen = transport.seen_turns.lock().await;
        // Second call carries user, model, user.
        assert_eq!(seen[1].len(), 3);
        assert_eq!(seen[1][0].role, TurnRole::User);
        assert_eq!(seen[1][1].role, TurnRole::Model);
        assert_eq!(seen[1][2].text, "segundo");
    }

    #[tokio::test]
    async fn test_initialize_replaces_existing_history() {
        let (relay, transport) = relay(vec![
            Behavior::Reply("r1".to_string()),
            Behavior::Reply("r2".to_string()),
        ]);
        relay.send("primero").await;
        relay.initialize().await;
        relay.send("segundo").await;

        let seen = transport.seen_turns.lock().await;
        assert_eq!(seen[1].len(), 1);
    }

    #[tokio::test]
    async fn test_empty_reply_degrades_to_processing_envelope() {
        let (relay, _) = relay(vec![Behavior::Empty]);
        let text = relay.send("Quiero reservar").await;
        let envelope = decode_envelope(&text).into_envelope();

        assert_eq!(envelope, processing_problem_envelope());
        // Restart option, not an echo of the utterance.
        assert_eq!(envelope.options[0].value, "Hola");
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_to_connection_envelope() {
        let (relay, _) = relay(vec![Behavior::Fail]);
        let text = relay.send("Quiero hacer una reserva").await;
        let envelope = decode_envelope(&text).into_envelope();

        assert_eq!(envelope.status, EnvelopeStatus::Unknown);
        assert_eq!(envelope.options.len(), 1);
        assert_eq!(envelope.options[0].kind, OptionKind::Message);
        assert_eq!(envelope.options[0].value, "Quiero hacer una reserva");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_resolves_with_connection_envelope() {
        let (relay, _) = relay(vec![Behavior::Hang]);
        let text = relay.send("¿Tienen menú vegano?").await;
        let envelope = decode_envelope(&text).into_envelope();

        assert_eq!(envelope, connection_error_envelope("¿Tienen menú vegano?"));
    }

    #[tokio::test]
    async fn test_failed_turn_is_not_kept_in_history() {
        let (relay, transport) = relay(vec![
            Behavior::Fail,
            Behavior::Reply("r".to_string()),
        ]);
        relay.send("Hola").await;
        relay.send("Hola").await;

        let seen = transport.seen_turns.lock().await;
        // The retried call must not carry the failed turn twice.
        assert_eq!(seen[1].len(), 1);
        assert_eq!(seen[1][0].text, "Hola");
    }
}
