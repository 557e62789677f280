//! Structured reply envelope and its decoder.
//!
//! Every assistant turn is expected to be a JSON envelope: display text,
//! suggested options, a conversation status, and (only once a reservation is
//! confirmed) a free-form detail record. The external model is asked for this
//! shape but does not contractually guarantee it, so decoding returns an
//! explicit [`DecodeOutcome`] instead of an error: the malformed arm carries
//! the raw text and degrades to a canonical fallback envelope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What activating an option does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Resend `value` as if the user had typed it.
    Message,
    /// Open `value` as an external link.
    Link,
    /// Open `value` as a contact target (WhatsApp / phone).
    Call,
}

/// A user-selectable affordance attached to an assistant turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatOption {
    pub label: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
}

impl ChatOption {
    pub fn message(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            kind: OptionKind::Message,
        }
    }

    pub fn link(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            kind: OptionKind::Link,
        }
    }

    pub fn call(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            kind: OptionKind::Call,
        }
    }
}

/// Conversation status reported by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Ongoing,
    Confirmed,
    Unknown,
    Cancelled,
}

/// The structured reply shape for one assistant turn.
///
/// `options` tolerates being absent (the model occasionally omits an empty
/// array); `message` and `status` are required for a successful decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Display text, markdown-formatted.
    pub message: String,
    #[serde(default)]
    pub options: Vec<ChatOption>,
    pub status: EnvelopeStatus,
    /// Free-form string record, populated only when status is `confirmed`.
    /// Partially-filled records from the model are accepted as-is.
    #[serde(
        rename = "reservationDetails",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reservation_details: Option<BTreeMap<String, String>>,
}

impl ResponseEnvelope {
    /// The canonical degraded envelope for text that failed to decode:
    /// the raw text verbatim, no options, status unknown.
    pub fn fallback(raw: impl Into<String>) -> Self {
        Self {
            message: raw.into(),
            options: Vec::new(),
            status: EnvelopeStatus::Unknown,
            reservation_details: None,
        }
    }

    /// Serializes the envelope back to JSON text.
    ///
    /// Envelope serialization cannot fail for these field types; the message
    /// text stands in should serde_json ever report otherwise.
    pub fn to_json_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }
}

/// Result of attempting to decode assistant text into an envelope.
///
/// Consumed by exhaustive matching; a parse failure is data, not an error
/// path, so callers can never observe one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The text decoded cleanly; returned unchanged.
    Structured(ResponseEnvelope),
    /// The text was not a valid envelope; `raw` is the original input.
    Malformed { raw: String },
}

impl DecodeOutcome {
    /// Collapses the outcome into an envelope, substituting the canonical
    /// fallback for the malformed arm.
    pub fn into_envelope(self) -> ResponseEnvelope {
        match self {
            Self::Structured(envelope) => envelope,
            Self::Malformed { raw } => ResponseEnvelope::fallback(raw),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// Attempts to decode arbitrary assistant text into a [`ResponseEnvelope`].
///
/// Pure function of its input; no side effects.
pub fn decode_envelope(text: &str) -> DecodeOutcome {
    match serde_json::from_str::<ResponseEnvelope>(text) {
        Ok(envelope) => DecodeOutcome::Structured(envelope),
        Err(_) => DecodeOutcome::Malformed {
            raw: text.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_envelope() -> ResponseEnvelope {
        ResponseEnvelope {
            message: "¿Para cuántos comensales sería la reserva?".to_string(),
            options: vec![
                ChatOption::message("2 personas", "2 personas"),
                ChatOption::message("4 personas", "4 personas"),
                ChatOption::link("📖 Ver Menú", "https://menu.maxirest.com/37835"),
                ChatOption::call("📞 Contáctanos", "https://wa.me/5491131804595"),
            ],
            status: EnvelopeStatus::Ongoing,
            reservation_details: None,
        }
    }

    #[test]
    fn test_decode_roundtrip_preserves_all_fields() {
        let envelope = sample_envelope();
        let text = envelope.to_json_text();
        match decode_envelope(&text) {
            DecodeOutcome::Structured(decoded) => assert_eq!(decoded, envelope),
            DecodeOutcome::Malformed { .. } => panic!("round-trip must decode"),
        }
    }

    #[test]
    fn test_decode_roundtrip_with_reservation_details() {
        let mut envelope = sample_envelope();
        envelope.status = EnvelopeStatus::Confirmed;
        envelope.reservation_details = Some(BTreeMap::from([
            ("name".to_string(), "Ana".to_string()),
            ("date".to_string(), "Mañana".to_string()),
            ("time".to_string(), "21:00".to_string()),
            ("people".to_string(), "5".to_string()),
            ("location".to_string(), "Patio".to_string()),
        ]));
        let decoded = decode_envelope(&envelope.to_json_text()).into_envelope();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_malformed_text_falls_back_verbatim() {
        let raw = "Lo siento, no entendí tu consulta.";
        let outcome = decode_envelope(raw);
        assert!(outcome.is_malformed());

        let envelope = outcome.into_envelope();
        assert_eq!(envelope.message, raw);
        assert!(envelope.options.is_empty());
        assert_eq!(envelope.status, EnvelopeStatus::Unknown);
        assert!(envelope.reservation_details.is_none());
    }

    #[test]
    fn test_valid_json_missing_status_is_malformed() {
        let raw = r#"{"message": "hola"}"#;
        assert!(decode_envelope(raw).is_malformed());
    }

    #[test]
    fn test_missing_options_array_is_tolerated() {
        let raw = r#"{"message": "hola", "status": "ongoing"}"#;
        let envelope = decode_envelope(raw).into_envelope();
        assert_eq!(envelope.status, EnvelopeStatus::Ongoing);
        assert!(envelope.options.is_empty());
    }

    #[test]
    fn test_option_kind_uses_type_field_on_the_wire() {
        let raw = r#"{"label": "Patio", "value": "Patio", "type": "message"}"#;
        let option: ChatOption = serde_json::from_str(raw).unwrap();
        assert_eq!(option.kind, OptionKind::Message);
    }

    #[test]
    fn test_unknown_status_value_is_malformed() {
        let raw = r#"{"message": "hola", "status": "pending", "options": []}"#;
        assert!(decode_envelope(raw).is_malformed());
    }

    #[test]
    fn test_partially_filled_details_are_accepted() {
        let raw = r#"{
            "message": "¡Todo listo!",
            "status": "confirmed",
            "options": [],
            "reservationDetails": {"name": "Ana", "people": "4"}
        }"#;
        let envelope = decode_envelope(raw).into_envelope();
        let details = envelope.reservation_details.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details["people"], "4");
    }
}
