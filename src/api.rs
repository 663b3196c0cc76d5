//! HTTP surface for the readaloud server.
//!
//! This module exposes a compact Axum router with two endpoints:
//!
//! - `GET /` – Welcome message, useful as a liveness probe.
//! - `POST /text-to-speech` – Multipart upload of a PDF or plain-text file
//!   plus an optional `voice` field; responds with the combined `audio/mpeg`
//!   body, or a JSON `{"detail": …}` error with a 4xx/5xx status.
//!
//! Temporary files created for a request are removed only after the response
//! body has been fully streamed: the cleanup guard travels inside the body
//! stream and drops when the stream does.

use crate::config::Config;
use crate::pipeline::{Document, PipelineApi, PipelineError, SpeechArtifact};
use axum::{
    Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use serde_json::json;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tower_http::cors::{Any, CorsLayer};

/// Voice used when the upload carries no `voice` field.
const DEFAULT_VOICE: &str = "alloy";

/// Upload cap. Extracted text is held in memory, so the limit is generous
/// but not unbounded.
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Build the HTTP router exposing the conversion API surface.
pub fn create_router<S>(service: Arc<S>, config: &Config) -> Router
where
    S: PipelineApi + 'static,
{
    Router::new()
        .route("/", get(welcome))
        .route("/text-to-speech", post(text_to_speech::<S>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors_layer(config))
        .with_state(service)
}

/// Permit the single configured origin, with all methods and headers.
fn cors_layer(config: &Config) -> CorsLayer {
    let origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .expect("ALLOWED_ORIGIN is not a valid header value");
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Root endpoint returning a static greeting.
async fn welcome() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to the Text-to-Speech API!" }))
}

/// Convert an uploaded document into one spoken-audio file.
async fn text_to_speech<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Response, AppError>
where
    S: PipelineApi,
{
    let mut upload: Option<(String, Bytes)> = None;
    let mut voice = DEFAULT_VOICE.to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("Invalid multipart payload: {err}")))?
    {
        match field.name() {
            Some("file") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|err| {
                    AppError::bad_request(format!("Failed to read uploaded file: {err}"))
                })?;
                upload = Some((content_type, data));
            }
            Some("voice") => {
                let value = field.text().await.map_err(|err| {
                    AppError::bad_request(format!("Failed to read voice field: {err}"))
                })?;
                if !value.trim().is_empty() {
                    voice = value;
                }
            }
            _ => {}
        }
    }

    let (content_type, data) =
        upload.ok_or_else(|| AppError::bad_request("No file field in upload"))?;
    let document = Document::from_upload(&content_type, data.to_vec())?;

    let artifact = service.synthesize_document(document, voice).await?;
    tracing::info!(
        chunks = artifact.chunk_count,
        output = %artifact.combined.display(),
        "Text-to-speech request completed"
    );
    Ok(audio_response(artifact))
}

/// Stream the combined file as an `audio/mpeg` attachment.
///
/// The temp-file guard is moved into the body stream, so every segment and
/// the combined file are removed once the body has been sent (or the
/// connection is dropped).
fn audio_response(artifact: SpeechArtifact) -> Response {
    let SpeechArtifact {
        combined,
        temp_files,
        ..
    } = artifact;
    let filename = combined
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "speech.mp3".to_string());

    let stream = async_stream::stream! {
        let guard = temp_files;
        let mut file = match tokio::fs::File::open(&combined).await {
            Ok(file) => file,
            Err(err) => {
                yield Err(err);
                drop(guard);
                return;
            }
        };
        let mut buffer = vec![0u8; 64 * 1024];
        loop {
            match file.read(&mut buffer).await {
                Ok(0) => break,
                Ok(n) => yield Ok(Bytes::copy_from_slice(&buffer[..n])),
                Err(err) => {
                    yield Err(err);
                    break;
                }
            }
        }
        drop(guard);
    };

    (
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Error wrapper mapping pipeline failures onto HTTP responses.
struct AppError {
    status: StatusCode,
    detail: String,
}

impl AppError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        let status = if inner.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %inner, "Pipeline failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            detail: inner.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
