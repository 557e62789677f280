//! Direct REST client for the Gemini `generateContent` endpoint.
//!
//! One client backs one session: it is configured once with the system
//! instruction and the structured-output hint, and receives the full turn
//! history on every call because the REST API is stateless.

use patio_core::config::ModelConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prompt::RESPONSE_SCHEMA;
use crate::transport::{ChatTurn, ModelTransport, TransportError};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Transport implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    system_instruction: String,
}

impl GeminiClient {
    /// Creates a client from model settings and a fixed system instruction.
    pub fn new(config: &ModelConfig, system_instruction: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            system_instruction: system_instruction.into(),
        }
    }

    fn build_request(&self, history: &[ChatTurn]) -> GenerateContentRequest {
        let contents = history
            .iter()
            .map(|turn| Content {
                role: turn.role,
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        GenerateContentRequest {
            contents,
            system_instruction: Some(Content {
                role: crate::transport::TurnRole::User,
                parts: vec![Part {
                    text: self.system_instruction.clone(),
                }],
            }),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json".to_string(),
                response_schema: RESPONSE_SCHEMA.clone(),
            },
        }
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, TransportError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| TransportError::Decode(err.to_string()))?;

        // Absent candidates/text is a successful call with no usable reply;
        // the relay degrades it, not the transport.
        Ok(extract_text(parsed).unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl ModelTransport for GeminiClient {
    async fn generate(&self, history: &[ChatTurn]) -> Result<String, TransportError> {
        let request = self.build_request(history);
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: crate::transport::TurnRole,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
}

fn map_http_error(status: StatusCode, body: String) -> TransportError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    TransportError::Http {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GeminiClient {
        let config = ModelConfig::new("test-key");
        GeminiClient::new(&config, "instrucciones")
    }

    #[test]
    fn test_request_body_uses_camel_case_wire_names() {
        let history = vec![ChatTurn::user("Hola"), ChatTurn::model("{\"x\":1}")];
        let request = test_client().build_request(&history);
        let body = serde_json::to_value(&request).unwrap();

        assert!(body.get("systemInstruction").is_some());
        let generation = body.get("generationConfig").unwrap();
        assert_eq!(generation["responseMimeType"], "application/json");
        assert_eq!(generation["temperature"], 0.5);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
    }

    #[test]
    fn test_request_carries_response_schema() {
        let request = test_client().build_request(&[ChatTurn::user("Hola")]);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body["generationConfig"]["responseSchema"]["type"],
            "OBJECT"
        );
    }

    #[test]
    fn test_extract_text_takes_first_textual_part() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"message\":\"hola\"}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(
            extract_text(response).as_deref(),
            Some(r#"{"message":"hola"}"#)
        );
    }

    #[test]
    fn test_extract_text_handles_empty_candidates() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(extract_text(response).is_none());
    }

    #[test]
    fn test_http_error_prefers_structured_message() {
        let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        match map_http_error(StatusCode::TOO_MANY_REQUESTS, body.to_string()) {
            TransportError::Http { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "RESOURCE_EXHAUSTED: quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
