//! Document text extraction.
//!
//! Plain-text payloads are decoded as UTF-8. PDFs are walked page by page:
//! each page's embedded text is taken directly, and when a page carries no
//! embedded text (typical for scanned documents) the page is rendered to an
//! image and handed to the OCR engine instead. Page texts are joined with a
//! single `\n`, in page order.

pub mod ocr;

use crate::pipeline::{Document, DocumentKind};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::sync::Arc;
use thiserror::Error;

pub use ocr::{Ocr, OcrError, TesseractOcr};

/// Longest rendered edge for pages sent to OCR. Bounds memory per page while
/// keeping glyphs large enough for reliable recognition.
const MAX_RENDERED_PIXELS: i32 = 2048;

/// Errors raised while turning a document payload into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Plain-text payload was not valid UTF-8.
    #[error("text file is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
    /// The payload could not be parsed or rendered as a PDF.
    #[error("failed to extract text from PDF: {0}")]
    MalformedPdf(String),
    /// OCR on a rendered page failed.
    #[error("OCR failed on page {page}: {source}")]
    Ocr {
        /// 1-based page number the failure occurred on.
        page: usize,
        /// Underlying engine error.
        #[source]
        source: OcrError,
    },
    /// The blocking extraction task was cancelled or panicked.
    #[error("extraction task failed: {0}")]
    TaskFailed(String),
}

/// Extract the complete text of `document`.
///
/// PDF parsing and OCR are blocking work (pdfium is a C library; the OCR
/// engine runs an external process), so PDF extraction is moved onto the
/// blocking thread pool rather than stalling the async runtime.
pub async fn extract_document(
    document: Document,
    ocr: Arc<dyn Ocr>,
) -> Result<String, ExtractError> {
    match document.kind {
        DocumentKind::PlainText => Ok(std::str::from_utf8(&document.bytes)?.to_string()),
        DocumentKind::Pdf => {
            tokio::task::spawn_blocking(move || extract_pdf(&document.bytes, ocr.as_ref()))
                .await
                .map_err(|err| ExtractError::TaskFailed(err.to_string()))?
        }
    }
}

/// Blocking implementation of PDF extraction with per-page OCR fallback.
fn extract_pdf(bytes: &[u8], ocr: &dyn Ocr) -> Result<String, ExtractError> {
    let pdfium = Pdfium::default();
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|err| ExtractError::MalformedPdf(format!("{err:?}")))?;
    collect_page_texts(document.pages().iter(), ocr)
}

/// One page of a document: its embedded text, plus a rendered image for OCR
/// when no embedded text exists.
trait PageContent {
    fn embedded_text(&self, page_number: usize) -> Result<String, ExtractError>;
    fn render(&self, page_number: usize) -> Result<DynamicImage, ExtractError>;
}

impl PageContent for PdfPage<'_> {
    fn embedded_text(&self, page_number: usize) -> Result<String, ExtractError> {
        self.text()
            .map(|text| text.all())
            .map_err(|err| ExtractError::MalformedPdf(format!("page {page_number}: {err:?}")))
    }

    fn render(&self, page_number: usize) -> Result<DynamicImage, ExtractError> {
        let config = PdfRenderConfig::new()
            .set_target_width(MAX_RENDERED_PIXELS)
            .set_maximum_height(MAX_RENDERED_PIXELS);
        self.render_with_config(&config)
            .map(|bitmap| bitmap.as_image())
            .map_err(|err| ExtractError::MalformedPdf(format!("page {page_number}: {err:?}")))
    }
}

/// Walk pages in order, taking embedded text where present and falling back
/// to OCR on blank pages. Page texts are joined with a single `\n`.
fn collect_page_texts<P: PageContent>(
    pages: impl Iterator<Item = P>,
    ocr: &dyn Ocr,
) -> Result<String, ExtractError> {
    let mut page_texts = Vec::new();
    for (index, page) in pages.enumerate() {
        let page_number = index + 1;
        let direct = page.embedded_text(page_number)?;
        if !direct.trim().is_empty() {
            page_texts.push(direct);
            continue;
        }

        // No embedded text: assume a scanned page and recognize its pixels.
        let image = page.render(page_number)?;
        let recognized = ocr.recognize(&image).map_err(|source| ExtractError::Ocr {
            page: page_number,
            source,
        })?;
        tracing::debug!(
            page = page_number,
            chars = recognized.len(),
            "Recovered page text via OCR"
        );
        page_texts.push(recognized);
    }

    Ok(page_texts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Document;
    use image::DynamicImage;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct UnreachableOcr;

    impl Ocr for UnreachableOcr {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            panic!("OCR must not run when embedded text is available");
        }
    }

    /// Page stub carrying only embedded text; renders a 1x1 placeholder.
    struct StubPage {
        embedded: &'static str,
    }

    impl PageContent for StubPage {
        fn embedded_text(&self, _page_number: usize) -> Result<String, ExtractError> {
            Ok(self.embedded.to_string())
        }

        fn render(&self, _page_number: usize) -> Result<DynamicImage, ExtractError> {
            Ok(DynamicImage::new_rgb8(1, 1))
        }
    }

    /// Returns one scripted answer per recognition call, in order.
    struct ScriptedOcr {
        answers: Mutex<VecDeque<&'static str>>,
    }

    impl ScriptedOcr {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().copied().collect()),
            }
        }
    }

    impl Ocr for ScriptedOcr {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            let mut answers = self.answers.lock().unwrap();
            Ok(answers.pop_front().expect("unexpected OCR call").to_string())
        }
    }

    struct FailingOcr;

    impl Ocr for FailingOcr {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            Err(OcrError::InvalidOutput)
        }
    }

    #[test]
    fn blank_pages_fall_back_to_ocr_in_page_order() {
        let pages = vec![
            StubPage { embedded: "Page one" },
            StubPage { embedded: "" },
            StubPage { embedded: "Page three" },
            StubPage { embedded: "   \n" },
        ];
        let ocr = ScriptedOcr::new(&["scanned two", "scanned four"]);

        let text = collect_page_texts(pages.into_iter(), &ocr).expect("extraction succeeded");
        assert_eq!(text, "Page one\nscanned two\nPage three\nscanned four");
    }

    #[test]
    fn pages_with_embedded_text_never_reach_ocr() {
        let pages = vec![
            StubPage { embedded: "First" },
            StubPage { embedded: "Second" },
        ];

        let text =
            collect_page_texts(pages.into_iter(), &UnreachableOcr).expect("extraction succeeded");
        assert_eq!(text, "First\nSecond");
    }

    #[test]
    fn ocr_failure_reports_the_page_number() {
        let pages = vec![
            StubPage { embedded: "Readable" },
            StubPage { embedded: "" },
        ];

        let error = collect_page_texts(pages.into_iter(), &FailingOcr).unwrap_err();
        assert!(matches!(error, ExtractError::Ocr { page: 2, .. }));
    }

    #[tokio::test]
    async fn plain_text_decodes_utf8() {
        let document = Document {
            bytes: "Hello world".as_bytes().to_vec(),
            kind: DocumentKind::PlainText,
        };
        let text = extract_document(document, Arc::new(UnreachableOcr))
            .await
            .expect("extraction succeeded");
        assert_eq!(text, "Hello world");
    }

    #[tokio::test]
    async fn invalid_utf8_is_rejected() {
        let document = Document {
            bytes: vec![0xff, 0xfe, 0xfd],
            kind: DocumentKind::PlainText,
        };
        let error = extract_document(document, Arc::new(UnreachableOcr))
            .await
            .unwrap_err();
        assert!(matches!(error, ExtractError::InvalidEncoding(_)));
    }
}
