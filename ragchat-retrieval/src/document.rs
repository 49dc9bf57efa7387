//! Data types for stored chunks and search results.

use serde::{Deserialize, Serialize};

/// A bounded span of document text stored as one retrievable unit.
///
/// Identity is `(source, sequence)`: re-ingesting the same document produces
/// the same ids, which the store treats as already-indexed no-ops. Chunks are
/// immutable once stored and are superseded only by clearing and re-ingesting
/// their source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentChunk {
    /// Unique identifier, rendered as `{file stem}_{sequence}`.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text. Empty until the
    /// pipeline attaches one.
    pub embedding: Vec<f32>,
    /// The filename of the source document.
    pub source: String,
    /// The 1-indexed page the chunk was extracted from.
    pub page: u32,
    /// The running per-document chunk index, starting at 0.
    pub sequence: u32,
}

impl DocumentChunk {
    /// Build a chunk with provenance but no embedding yet.
    pub fn new(text: impl Into<String>, source: impl Into<String>, page: u32, sequence: u32) -> Self {
        let source = source.into();
        let stem = source.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(&source);
        Self {
            id: format!("{stem}_{sequence}"),
            text: text.into(),
            embedding: Vec::new(),
            source,
            page,
            sequence,
        }
    }
}

/// A retrieved [`DocumentChunk`] paired with a strategy-specific score.
///
/// The vector strategy scores by cosine distance (lower is better); the
/// keyword strategy scores by query-word overlap count (higher is better).
/// Results are always ordered best-to-worst regardless of strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: DocumentChunk,
    /// The strategy-specific relevance score.
    pub score: f32,
}
