//! Vector store trait for persisting chunks and searching by similarity.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::document::{DocumentChunk, SearchResult};
use crate::error::Result;

/// A storage backend for embedded chunks with similarity search.
///
/// Implementations manage named collections of [`DocumentChunk`]s. One
/// collection holds vectors of a single fixed dimension; the distance metric
/// is cosine distance (`1 − cosine similarity`) and is fixed for the life of
/// the collection, since mixing metrics corrupts ranking.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection. No-op if it already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its data.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Remove every entry from a collection, keeping the collection itself.
    ///
    /// Atomic from the caller's view: a concurrent [`search`](Self::search)
    /// observes either the pre-clear or post-clear state, never a partially
    /// cleared one.
    async fn clear_collection(&self, name: &str) -> Result<()>;

    /// Insert chunks that are not already indexed.
    ///
    /// An id collision is a successful no-op (the chunk is already indexed,
    /// by identity), not an error. Returns the number of chunks actually
    /// inserted. Chunks must carry embeddings of the collection's dimension.
    async fn upsert(&self, collection: &str, chunks: &[DocumentChunk]) -> Result<usize>;

    /// The number of entries currently in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// The distinct source document names currently indexed.
    async fn sources(&self, collection: &str) -> Result<BTreeSet<String>>;

    /// The `top_k` entries nearest to `embedding` by cosine distance,
    /// ordered ascending (best first).
    ///
    /// An empty collection yields an empty result, not an error.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;
}
