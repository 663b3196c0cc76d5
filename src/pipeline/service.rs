//! Pipeline service coordinating extraction, chunking, synthesis, and assembly.

use crate::{
    assembly::AudioAssembler,
    config::Config,
    extract::{self, Ocr},
    pipeline::{
        chunking::chunk_text,
        cleanup::TempFiles,
        types::{Document, PipelineError},
    },
    synthesis::SpeechBackend,
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Result of a completed document-to-speech conversion.
///
/// The combined file path is also tracked by `temp_files`, so the artifact's
/// owner controls when every file created for the request is removed.
#[derive(Debug)]
pub struct SpeechArtifact {
    /// Path of the combined audio file.
    pub combined: PathBuf,
    /// Number of chunks synthesized for the document.
    pub chunk_count: usize,
    /// Guard owning every file created for this request.
    pub temp_files: TempFiles,
}

/// Abstraction over the conversion pipeline used by the HTTP surface.
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Convert a document into one combined audio file.
    async fn synthesize_document(
        &self,
        document: Document,
        voice: String,
    ) -> Result<SpeechArtifact, PipelineError>;
}

/// Sequences the pipeline end to end for one request: extract text, chunk
/// it, synthesize each chunk strictly in order, and concatenate the segment
/// files into a single output.
///
/// The service owns long-lived handles to the OCR engine, the speech
/// backend, and the audio assembler. Construct it once near process start
/// and share it through an `Arc`. Requests never share files: every segment
/// and output name is drawn from a uuid generator.
pub struct TtsPipeline {
    config: Arc<Config>,
    ocr: Arc<dyn Ocr>,
    speech: Arc<dyn SpeechBackend>,
    assembler: Arc<dyn AudioAssembler>,
}

impl TtsPipeline {
    /// Wire the pipeline with the given collaborators.
    pub fn new(
        config: Arc<Config>,
        ocr: Arc<dyn Ocr>,
        speech: Arc<dyn SpeechBackend>,
        assembler: Arc<dyn AudioAssembler>,
    ) -> Self {
        Self {
            config,
            ocr,
            speech,
            assembler,
        }
    }

    fn fresh_path(&self) -> PathBuf {
        self.config.work_dir.join(format!("{}.mp3", Uuid::new_v4()))
    }

    async fn run(&self, document: Document, voice: String) -> Result<SpeechArtifact, PipelineError> {
        let text = extract::extract_document(document, Arc::clone(&self.ocr)).await?;
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyDocument);
        }

        let chunks = chunk_text(&text, self.config.chunk_size);
        tracing::info!(
            chunks = chunks.len(),
            chunk_size = self.config.chunk_size,
            voice = %voice,
            "Synthesizing document"
        );

        // Strictly sequential: chunk N is not requested before chunk N-1 has
        // been persisted, so segment order always matches text order. On any
        // failure the guard drops here and removes what was already written.
        let mut temp_files = TempFiles::new();
        for (index, chunk) in chunks.iter().enumerate() {
            let audio = self.speech.speak(chunk, &voice).await?;
            let path = self.fresh_path();
            tokio::fs::write(&path, &audio)
                .await
                .map_err(crate::synthesis::SynthesisError::Io)?;
            temp_files.track(path);
            tracing::debug!(
                segment = index + 1,
                total = chunks.len(),
                bytes = audio.len(),
                "Stored audio segment"
            );
        }

        let segments = temp_files.paths().to_vec();
        let combined = self.fresh_path();
        temp_files.track(combined.clone());
        self.assembler.combine(&segments, &combined).await?;

        tracing::info!(
            segments = segments.len(),
            output = %combined.display(),
            "Document synthesized"
        );
        Ok(SpeechArtifact {
            combined,
            chunk_count: chunks.len(),
            temp_files,
        })
    }
}

#[async_trait]
impl PipelineApi for TtsPipeline {
    async fn synthesize_document(
        &self,
        document: Document,
        voice: String,
    ) -> Result<SpeechArtifact, PipelineError> {
        self.run(document, voice).await
    }
}
