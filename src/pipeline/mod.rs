//! Document-to-speech pipeline: chunking, orchestration, and temp-file cleanup.

pub mod chunking;
pub mod cleanup;
mod service;
pub mod types;

pub use cleanup::TempFiles;
pub use service::{PipelineApi, SpeechArtifact, TtsPipeline};
pub use types::{Document, DocumentKind, PipelineError};
