//! Page-level document text extraction.

use crate::error::Result;

/// One page of extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-indexed page number.
    pub number: u32,
    /// The extracted text; empty if the page had none or failed to extract.
    pub text: String,
}

/// A collaborator that turns raw document bytes into per-page text.
///
/// A document that cannot be parsed at all fails with
/// [`RagError::Extraction`](crate::RagError::Extraction). Failures on
/// individual pages are not errors: implementations log them and yield the
/// page with empty text, so ingestion of the remaining pages continues.
pub trait PageExtractor: Send + Sync {
    /// Extract the ordered pages of a document.
    fn extract_pages(&self, bytes: &[u8], filename: &str) -> Result<Vec<PageText>>;
}
