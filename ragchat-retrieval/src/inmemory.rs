//! In-memory vector store using cosine distance.
//!
//! [`InMemoryVectorStore`] is backed by a `HashMap` behind a
//! `tokio::sync::RwLock`. Clearing takes the writer lock for the whole
//! operation, so concurrent readers see either the full pre-clear index or an
//! empty one, never a partial state.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{DocumentChunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "InMemory";

#[derive(Debug, Default)]
struct Collection {
    dimensions: usize,
    chunks: HashMap<String, DocumentChunk>,
}

/// An in-memory vector store searching by cosine distance.
///
/// Collections map collection name → chunk id → chunk. All operations are
/// async-safe via `tokio::sync::RwLock`; mutation takes the writer lock, so
/// the single-writer/multiple-reader discipline the index needs holds by
/// construction.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing_collection(name: &str) -> RagError {
    RagError::Index {
        backend: BACKEND.to_string(),
        message: format!("collection '{name}' does not exist"),
    }
}

/// Cosine distance between two vectors: `1 − cosine similarity`.
///
/// Returns 1.0 (maximally distant) if either vector has zero magnitude.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(name.to_string())
            .or_insert_with(|| Collection { dimensions, chunks: HashMap::new() });
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn clear_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        let collection = collections.get_mut(name).ok_or_else(|| missing_collection(name))?;
        collection.chunks.clear();
        Ok(())
    }

    async fn upsert(&self, collection: &str, chunks: &[DocumentChunk]) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| missing_collection(collection))?;

        for chunk in chunks {
            if chunk.embedding.len() != store.dimensions {
                return Err(RagError::Index {
                    backend: BACKEND.to_string(),
                    message: format!(
                        "chunk '{}' has dimension {} but collection '{collection}' expects {}",
                        chunk.id,
                        chunk.embedding.len(),
                        store.dimensions
                    ),
                });
            }
        }

        let mut inserted = 0;
        for chunk in chunks {
            // Id collision means the chunk is already indexed; keep the
            // existing entry and report success.
            if !store.chunks.contains_key(&chunk.id) {
                store.chunks.insert(chunk.id.clone(), chunk.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| missing_collection(collection))?;
        Ok(store.chunks.len())
    }

    async fn sources(&self, collection: &str) -> Result<BTreeSet<String>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| missing_collection(collection))?;
        Ok(store.chunks.values().map(|c| c.source.clone()).collect())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| missing_collection(collection))?;

        let mut scored: Vec<SearchResult> = store
            .chunks
            .values()
            .map(|chunk| SearchResult {
                score: cosine_distance(&chunk.embedding, embedding),
                chunk: chunk.clone(),
            })
            .collect();

        scored.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}
