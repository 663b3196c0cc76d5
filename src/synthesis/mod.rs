//! Speech-synthesis client abstraction and the OpenAI-backed adapter.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors raised by speech backends.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The remote API rejected the request as malformed (HTTP 4xx).
    #[error("speech API rejected the request ({status}): {detail}")]
    Rejected {
        /// HTTP status returned by the API.
        status: u16,
        /// Response body captured for diagnostics.
        detail: String,
    },
    /// The remote API failed (HTTP 5xx).
    #[error("speech API unavailable ({status}): {detail}")]
    Unavailable {
        /// HTTP status returned by the API.
        status: u16,
        /// Response body captured for diagnostics.
        detail: String,
    },
    /// The request never produced a response (connect/timeout/body errors).
    #[error("speech API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Persisting returned audio to disk failed.
    #[error("failed to persist audio segment: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthesisError {
    /// Whether the remote API refused the request itself, as opposed to an
    /// outage or local I/O failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Interface implemented by speech-synthesis backends.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Synthesize `text` with the given voice, returning raw audio bytes.
    async fn speak(&self, text: &str, voice: &str) -> Result<Bytes, SynthesisError>;
}

/// Client for an OpenAI-compatible `/audio/speech` endpoint.
pub struct OpenAiSpeech {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(serde::Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
}

impl OpenAiSpeech {
    /// Build a client for the configured endpoint and credential.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl SpeechBackend for OpenAiSpeech {
    async fn speak(&self, text: &str, voice: &str) -> Result<Bytes, SynthesisError> {
        let request = SpeechRequest {
            model: &self.model,
            voice,
            input: text,
        };
        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.bytes().await?);
        }

        let detail = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(SynthesisError::Rejected {
                status: status.as_u16(),
                detail,
            })
        } else {
            Err(SynthesisError::Unavailable {
                status: status.as_u16(),
                detail,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn client_for(server: &MockServer) -> OpenAiSpeech {
        OpenAiSpeech::new(server.base_url(), "test-key", "tts-1")
    }

    #[tokio::test]
    async fn speak_sends_model_voice_and_input() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/audio/speech")
                    .header("authorization", "Bearer test-key")
                    .json_body(json!({
                        "model": "tts-1",
                        "voice": "alloy",
                        "input": "Hello world"
                    }));
                then.status(200).body(b"mp3-bytes");
            })
            .await;

        let audio = client_for(&server)
            .speak("Hello world", "alloy")
            .await
            .expect("synthesis succeeded");

        mock.assert_async().await;
        assert_eq!(audio.as_ref(), b"mp3-bytes");
    }

    #[tokio::test]
    async fn client_error_surfaces_as_rejection() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/audio/speech");
                then.status(400).body("voice not recognized");
            })
            .await;

        let error = client_for(&server)
            .speak("Hello", "no-such-voice")
            .await
            .unwrap_err();

        assert!(error.is_rejection());
        match error {
            SynthesisError::Rejected { status, detail } => {
                assert_eq!(status, 400);
                assert!(detail.contains("voice"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_surfaces_as_unavailable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/audio/speech");
                then.status(503).body("overloaded");
            })
            .await;

        let error = client_for(&server).speak("Hello", "alloy").await.unwrap_err();

        assert!(!error.is_rejection());
        assert!(matches!(error, SynthesisError::Unavailable { status: 503, .. }));
    }
}
