//! Core data types and error definitions for the conversion pipeline.

use crate::assembly::AssembleError;
use crate::extract::ExtractError;
use crate::synthesis::SynthesisError;
use thiserror::Error;

/// Supported document media types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    /// `application/pdf` payload.
    Pdf,
    /// `text/plain` payload.
    PlainText,
}

impl DocumentKind {
    /// Map a declared content type onto a supported kind.
    ///
    /// Parameters after a `;` (for example `text/plain; charset=utf-8`) are
    /// ignored when matching.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim();
        match media_type {
            "application/pdf" => Some(Self::Pdf),
            "text/plain" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// An uploaded document: raw payload plus its declared media type.
///
/// Exists only for the duration of one request.
#[derive(Debug)]
pub struct Document {
    /// Raw uploaded bytes.
    pub bytes: Vec<u8>,
    /// Declared media type of the payload.
    pub kind: DocumentKind,
}

impl Document {
    /// Validate the declared content type of an upload and wrap its payload.
    ///
    /// This is the pipeline's admission check: unsupported media types are
    /// rejected here, before any extraction is attempted.
    pub fn from_upload(content_type: &str, bytes: Vec<u8>) -> Result<Self, PipelineError> {
        let kind = DocumentKind::from_content_type(content_type).ok_or_else(|| {
            PipelineError::UnsupportedType {
                content_type: content_type.to_string(),
            }
        })?;
        Ok(Self { bytes, kind })
    }
}

/// Errors emitted by the document-to-speech pipeline.
///
/// Every failure aborts the request; there is no partial-success path.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Upload declared a media type the pipeline does not handle.
    #[error("Only .pdf and .txt files are allowed (got '{content_type}')")]
    UnsupportedType {
        /// Content type declared by the upload.
        content_type: String,
    },
    /// Extraction produced no text worth synthesizing.
    #[error("The file is empty or contains no text.")]
    EmptyDocument,
    /// The payload could not be parsed as the declared type.
    #[error("Failed to process file: {0}")]
    Extract(#[from] ExtractError),
    /// A per-chunk synthesis call failed.
    #[error("Speech synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
    /// Concatenating the segment files failed.
    #[error("Failed to combine audio segments: {0}")]
    Assemble(#[from] AssembleError),
}

impl PipelineError {
    /// Whether the failure is attributable to the client's request.
    ///
    /// Client failures map to 4xx responses; everything else is a 5xx.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::UnsupportedType { .. } | Self::EmptyDocument => true,
            // A failed extraction task is a runtime fault (the blocking task
            // panicked or was cancelled), not a bad upload.
            Self::Extract(err) => matches!(
                err,
                ExtractError::InvalidEncoding(_)
                    | ExtractError::MalformedPdf(_)
                    | ExtractError::Ocr { .. }
            ),
            Self::Synthesis(err) => err.is_rejection(),
            Self::Assemble(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_matching_ignores_parameters() {
        assert_eq!(
            DocumentKind::from_content_type("text/plain; charset=utf-8"),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(
            DocumentKind::from_content_type("application/pdf"),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(DocumentKind::from_content_type("image/png"), None);
    }

    #[test]
    fn unsupported_upload_is_rejected_before_extraction() {
        let error = Document::from_upload("image/png", vec![1, 2, 3]).unwrap_err();
        assert!(matches!(error, PipelineError::UnsupportedType { .. }));
        assert!(error.is_client_error());
        assert!(error.to_string().contains("allowed"));
    }

    #[test]
    fn extraction_task_failure_is_a_server_error() {
        let error = PipelineError::Extract(ExtractError::TaskFailed("task panicked".into()));
        assert!(!error.is_client_error());

        let error = PipelineError::Extract(ExtractError::MalformedPdf("bad xref table".into()));
        assert!(error.is_client_error());
    }

    #[test]
    fn rejection_maps_to_client_error() {
        let error = PipelineError::Synthesis(SynthesisError::Rejected {
            status: 400,
            detail: "voice not recognized".into(),
        });
        assert!(error.is_client_error());

        let error = PipelineError::Synthesis(SynthesisError::Unavailable {
            status: 503,
            detail: "outage".into(),
        });
        assert!(!error.is_client_error());
    }
}
