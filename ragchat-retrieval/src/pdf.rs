//! PDF page extraction backed by `lopdf`.
//!
//! This module is only available when the `pdf` feature is enabled.

use lopdf::Document;
use tracing::warn;

use crate::error::{RagError, Result};
use crate::extract::{PageExtractor, PageText};

/// A [`PageExtractor`] that parses PDF bytes with `lopdf`.
///
/// Pages whose text extraction fails are logged and yielded empty, so a
/// single bad page never aborts ingestion of the rest of the document.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self
    }
}

impl PageExtractor for PdfExtractor {
    fn extract_pages(&self, bytes: &[u8], filename: &str) -> Result<Vec<PageText>> {
        let document = Document::load_mem(bytes).map_err(|e| RagError::Extraction {
            source_document: filename.to_string(),
            message: format!("failed to parse PDF: {e}"),
        })?;

        let pages = document.get_pages();
        let mut out = Vec::with_capacity(pages.len());
        for (&number, _) in &pages {
            let text = match document.extract_text(&[number]) {
                Ok(text) => text,
                Err(e) => {
                    warn!(source = filename, page = number, error = %e, "page extraction failed, skipping page");
                    String::new()
                }
            };
            out.push(PageText { number, text });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_with_extraction_error() {
        let extractor = PdfExtractor::new();
        let err = extractor.extract_pages(b"not a pdf", "bad.pdf");
        match err {
            Err(RagError::Extraction { source_document, .. }) => {
                assert_eq!(source_document, "bad.pdf");
            }
            other => panic!("expected extraction error, got {other:?}"),
        }
    }
}
