//! OCR engine contract and the tesseract-backed implementation.

use image::DynamicImage;
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// Errors raised by an OCR engine.
#[derive(Debug, Error)]
pub enum OcrError {
    /// Staging the page image on disk failed.
    #[error("failed to stage page image: {0}")]
    Image(String),
    /// Spawning or talking to the OCR binary failed.
    #[error("failed to run OCR binary: {0}")]
    Io(#[from] std::io::Error),
    /// The OCR binary ran but reported an error.
    #[error("OCR binary exited with {status}: {stderr}")]
    EngineFailed {
        /// Exit status reported by the process.
        status: ExitStatus,
        /// Captured stderr output.
        stderr: String,
    },
    /// The OCR binary produced non-UTF-8 output.
    #[error("OCR output was not valid UTF-8")]
    InvalidOutput,
}

/// Recognizes text in a rendered page image.
///
/// Implementations are synchronous; extraction already runs on the blocking
/// thread pool.
pub trait Ocr: Send + Sync {
    /// Return whatever text can be recognized in `image` (possibly empty).
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// OCR engine that shells out to the `tesseract` CLI.
///
/// The rendered page is written to a temporary PNG, then
/// `tesseract <image> stdout` is run and its stdout captured. The temporary
/// image is removed when the handle drops.
pub struct TesseractOcr {
    binary: String,
}

impl TesseractOcr {
    /// Create an engine invoking the given tesseract binary.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Ocr for TesseractOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let staged = tempfile::Builder::new()
            .prefix("readaloud-page-")
            .suffix(".png")
            .tempfile()?;
        image
            .save(staged.path())
            .map_err(|err| OcrError::Image(err.to_string()))?;

        let output = Command::new(&self.binary)
            .arg(staged.path())
            .arg("stdout")
            .output()?;
        if !output.status.success() {
            return Err(OcrError::EngineFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| OcrError::InvalidOutput)
    }
}
