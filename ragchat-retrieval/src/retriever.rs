//! Retrieval strategies and context-block formatting.
//!
//! Two interchangeable strategies implement [`RetrievalStrategy`]:
//!
//! - [`VectorRetriever`]: embeds the query and searches the vector store by
//!   cosine distance (lower score is better).
//! - [`KeywordRetriever`]: ranks in-memory line chunks by query-word overlap
//!   count (higher score is better); no embedding step, no external index.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::document::{DocumentChunk, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// The literal substituted when retrieval yields nothing.
pub const NO_CONTEXT_PLACEHOLDER: &str = "No vector context available.";

/// A strategy answering "which stored chunks are relevant to this query?".
///
/// Returns up to `top_k` results ordered best-to-worst. Score semantics are
/// strategy-specific; see [`SearchResult`].
#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    /// Retrieve the `top_k` most relevant chunks for a query.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>>;
}

/// Format retrieval results into the context block injected into the system
/// turn.
///
/// Each result is framed with its provenance and score; an empty result list
/// yields the [`NO_CONTEXT_PLACEHOLDER`] literal.
pub fn format_context(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_CONTEXT_PLACEHOLDER.to_string();
    }

    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        let _ = write!(
            out,
            "--- Source: {} (page {}, score: {:.4}) ---\n{}",
            result.chunk.source, result.chunk.page, result.score, result.chunk.text
        );
    }
    out
}

/// Embedding-backed retrieval over a [`VectorStore`] collection.
pub struct VectorRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
}

impl VectorRetriever {
    /// Create a retriever over one collection of a store.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self { embedder, store, collection: collection.into() }
    }
}

#[async_trait]
impl RetrievalStrategy for VectorRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        // An unavailable index degrades to "nothing retrieved"; embedding
        // failures still propagate so the caller can report them.
        let count = match self.store.count(&self.collection).await {
            Ok(count) => count,
            Err(RagError::Index { message, .. }) => {
                warn!(collection = %self.collection, reason = %message, "index unavailable, returning no context");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        if count == 0 {
            debug!(collection = %self.collection, "index is empty, skipping retrieval");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let results = match self.store.search(&self.collection, &query_embedding, top_k).await {
            Ok(results) => results,
            Err(RagError::Index { message, .. }) => {
                warn!(collection = %self.collection, reason = %message, "index search failed, returning no context");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        debug!(collection = %self.collection, result_count = results.len(), "vector retrieval done");
        Ok(results)
    }
}

/// Keyword-overlap fallback retrieval over an in-memory line corpus.
///
/// The corpus is fed at extraction time via
/// [`add_page`](KeywordRetriever::add_page); each non-blank line becomes one
/// candidate chunk. A query is lowercased into a word set and each line is
/// scored by how many query words it contains (substring containment).
/// Lines scoring zero are dropped; ties keep their original corpus order.
#[derive(Debug, Default)]
pub struct KeywordRetriever {
    lines: RwLock<Vec<DocumentChunk>>,
}

impl KeywordRetriever {
    /// Create an empty keyword retriever.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one page of extracted text to the corpus.
    pub async fn add_page(&self, source: &str, page: u32, text: &str) {
        let mut lines = self.lines.write().await;
        let mut sequence = lines.iter().filter(|c| c.source == source).count() as u32;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            lines.push(DocumentChunk::new(line, source, page, sequence));
            sequence += 1;
        }
    }

    /// Drop the whole corpus.
    pub async fn clear(&self) {
        self.lines.write().await.clear();
    }

    /// The number of line chunks currently held.
    pub async fn len(&self) -> usize {
        self.lines.read().await.len()
    }

    /// Whether the corpus is empty.
    pub async fn is_empty(&self) -> bool {
        self.lines.read().await.is_empty()
    }
}

#[async_trait]
impl RetrievalStrategy for KeywordRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let query_words: BTreeSet<String> =
            query.to_lowercase().split_whitespace().map(str::to_string).collect();

        let lines = self.lines.read().await;
        let mut ranked: Vec<SearchResult> = lines
            .iter()
            .filter_map(|chunk| {
                let lowered = chunk.text.to_lowercase();
                let score = query_words.iter().filter(|w| lowered.contains(w.as_str())).count();
                (score > 0)
                    .then(|| SearchResult { chunk: chunk.clone(), score: score as f32 })
            })
            .collect();

        // sort_by is stable, so equal scores keep corpus order.
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(top_k);
        debug!(result_count = ranked.len(), "keyword retrieval done");
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_results_format_as_placeholder() {
        assert_eq!(format_context(&[]), NO_CONTEXT_PLACEHOLDER);
    }

    #[test]
    fn formatted_context_carries_provenance() {
        let mut chunk = DocumentChunk::new("body text", "report.pdf", 4, 2);
        chunk.embedding = vec![0.0];
        let block = format_context(&[SearchResult { chunk, score: 0.1234 }]);
        assert!(block.contains("--- Source: report.pdf (page 4, score: 0.1234) ---"));
        assert!(block.ends_with("body text"));
    }

    #[tokio::test]
    async fn keyword_scores_by_overlap_and_drops_zero() {
        let retriever = KeywordRetriever::new();
        retriever
            .add_page("notes.txt", 1, "rust is fast\npython is friendly\nrust and python\n")
            .await;

        let results = retriever.retrieve("Rust Python", 10).await.unwrap();
        assert_eq!(results.len(), 3);
        // "rust and python" matches both query words.
        assert_eq!(results[0].chunk.text, "rust and python");
        assert_eq!(results[0].score, 2.0);
    }

    #[tokio::test]
    async fn keyword_ties_keep_corpus_order() {
        let retriever = KeywordRetriever::new();
        retriever.add_page("a.txt", 1, "cat one\ncat two\ncat three").await;

        let results = retriever.retrieve("cat", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "cat one");
        assert_eq!(results[1].chunk.text, "cat two");
    }

    #[tokio::test]
    async fn keyword_empty_corpus_returns_empty() {
        let retriever = KeywordRetriever::new();
        assert!(retriever.is_empty().await);
        assert!(retriever.retrieve("anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn keyword_corpus_tracks_size_and_clears() {
        let retriever = KeywordRetriever::new();
        retriever.add_page("a.txt", 1, "one line\n\ntwo line\nblank skipped below\n\n").await;
        assert_eq!(retriever.len().await, 3);
        assert!(!retriever.is_empty().await);

        retriever.clear().await;
        assert_eq!(retriever.len().await, 0);
        assert!(retriever.is_empty().await);
        assert!(retriever.retrieve("line", 5).await.unwrap().is_empty());
    }
}
