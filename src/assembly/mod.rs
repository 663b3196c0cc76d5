//! Concatenation of ordered audio segments into one output file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;
use tokio::process::Command;

/// Errors raised while combining audio segments.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// Writing the concat manifest or launching the audio tool failed.
    #[error("failed to run audio tool: {0}")]
    Io(#[from] std::io::Error),
    /// The audio tool ran but reported an error.
    #[error("audio tool exited with {status}: {stderr}")]
    ToolFailed {
        /// Exit status reported by the process.
        status: ExitStatus,
        /// Captured stderr output.
        stderr: String,
    },
}

/// Combines an ordered sequence of segment files into one audio file.
#[async_trait]
pub trait AudioAssembler: Send + Sync {
    /// Concatenate `segments` in order into `output`.
    async fn combine(&self, segments: &[PathBuf], output: &Path) -> Result<(), AssembleError>;
}

/// Assembler that drives the ffmpeg CLI through its concat demuxer.
///
/// Segment files are MP3 throughout, so the streams are copied
/// (`-c copy`) rather than re-encoded.
pub struct FfmpegAssembler {
    binary: String,
}

impl FfmpegAssembler {
    /// Create an assembler invoking the given ffmpeg binary.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

/// Render the concat-demuxer manifest listing each segment in order.
///
/// Segment names are uuid-generated, so no quoting beyond the demuxer's
/// single quotes is needed.
fn concat_manifest(segments: &[PathBuf]) -> String {
    segments
        .iter()
        .map(|path| format!("file '{}'\n", path.display()))
        .collect()
}

#[async_trait]
impl AudioAssembler for FfmpegAssembler {
    async fn combine(&self, segments: &[PathBuf], output: &Path) -> Result<(), AssembleError> {
        let manifest = tempfile::Builder::new()
            .prefix("readaloud-concat-")
            .suffix(".txt")
            .tempfile()?;
        tokio::fs::write(manifest.path(), concat_manifest(segments)).await?;

        let result = Command::new(&self.binary)
            .arg("-y")
            .args(["-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
            .arg(manifest.path())
            .args(["-c", "copy"])
            .arg(output)
            .output()
            .await?;
        if !result.status.success() {
            return Err(AssembleError::ToolFailed {
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            });
        }

        tracing::debug!(
            segments = segments.len(),
            output = %output.display(),
            "Combined audio segments"
        );
        Ok(())
    }
}
