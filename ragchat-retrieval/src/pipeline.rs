//! Ingestion pipeline orchestrator.
//!
//! [`RagPipeline`] composes a [`PageExtractor`], a [`Chunker`], an
//! [`EmbeddingProvider`], and a [`VectorStore`] into the
//! `extract → chunk → embed → upsert` workflow, and serves queries through
//! the same embedder and store.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragchat_retrieval::{InMemoryVectorStore, ParagraphChunker, RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .chunker(Arc::new(ParagraphChunker::new(1000, 200)))
//!     .extractor(Arc::new(extractor))
//!     .build()?;
//!
//! let (docs, chunks) = pipeline.ingest_folder("data_pdfs", true).await?;
//! ```

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{DocumentChunk, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract::PageExtractor;
use crate::retriever::VectorRetriever;
use crate::vectorstore::VectorStore;

/// Default collection name for the single local index.
const DEFAULT_COLLECTION: &str = "pdf_chunks";

/// The ingestion and query orchestrator.
///
/// Ingestion is at-least-once and non-atomic across a document: chunks are
/// embedded and upserted one page-batch at a time, so an embedding failure
/// mid-document leaves earlier batches stored. Re-running ingestion is safe
/// because upserts of already-indexed identities are no-ops.
pub struct RagPipeline {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
    extractor: Arc<dyn PageExtractor>,
    collection: String,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return the collection name this pipeline indexes into.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Build a [`VectorRetriever`] sharing this pipeline's embedder and store.
    pub fn retriever(&self) -> VectorRetriever {
        VectorRetriever::new(self.embedder.clone(), self.store.clone(), self.collection.clone())
    }

    /// Create the collection if it does not exist yet.
    async fn ensure_collection(&self) -> Result<()> {
        self.store.create_collection(&self.collection, self.embedder.dimensions()).await
    }

    /// Ingest one document: extract pages, chunk, embed, upsert.
    ///
    /// Each chunk is tagged with the filename, its 1-indexed page number,
    /// and a running per-document sequence. Returns the number of chunks
    /// newly added; a document with no extractable text yields 0, which is
    /// not an error.
    ///
    /// # Errors
    ///
    /// [`RagError::Extraction`] if the document cannot be parsed at all,
    /// [`RagError::Embedding`] if the embedding backend fails (chunks from
    /// pages embedded before the failure remain stored), or
    /// [`RagError::Index`] if the store rejects the upsert.
    pub async fn ingest_document(&self, bytes: &[u8], filename: &str) -> Result<usize> {
        self.ensure_collection().await?;

        let pages = self.extractor.extract_pages(bytes, filename)?;

        let mut sequence: u32 = 0;
        let mut added = 0;
        for page in &pages {
            let texts = self.chunker.split(&page.text);
            if texts.is_empty() {
                continue;
            }

            let mut chunks: Vec<DocumentChunk> = texts
                .into_iter()
                .map(|text| {
                    let chunk = DocumentChunk::new(text, filename, page.number, sequence);
                    sequence += 1;
                    chunk
                })
                .collect();

            let chunk_texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
            let embeddings = self.embedder.embed_batch(&chunk_texts).await.inspect_err(|e| {
                error!(source = filename, page = page.number, error = %e, "embedding failed during ingestion");
            })?;
            for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
                chunk.embedding = embedding;
            }

            added += self.store.upsert(&self.collection, &chunks).await.inspect_err(|e| {
                error!(source = filename, page = page.number, error = %e, "upsert failed during ingestion");
            })?;
        }

        info!(source = filename, chunks_added = added, "ingested document");
        Ok(added)
    }

    /// Ingest every PDF in a folder.
    ///
    /// With `clear_first` the index is emptied before loading; use this for
    /// a cold start. Without it, ingestion is incremental and existing
    /// indexed material is preserved. Files that fail to read or parse are
    /// logged and skipped; embedding and store failures abort.
    ///
    /// Returns `(documents_processed, chunks_added)`.
    pub async fn ingest_folder(
        &self,
        folder: impl AsRef<Path>,
        clear_first: bool,
    ) -> Result<(usize, usize)> {
        self.ensure_collection().await?;
        if clear_first {
            info!(collection = %self.collection, "clearing index before reload");
            self.store.clear_collection(&self.collection).await?;
        }

        let folder = folder.as_ref();
        let mut entries = tokio::fs::read_dir(folder).await.map_err(|e| {
            RagError::Pipeline(format!("failed to read folder '{}': {e}", folder.display()))
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            RagError::Pipeline(format!("failed to read folder '{}': {e}", folder.display()))
        })? {
            let path = entry.path();
            let is_pdf = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if is_pdf {
                files.push(path);
            }
        }
        // Deterministic ingestion order regardless of directory iteration.
        files.sort();

        let mut documents = 0;
        let mut chunks = 0;
        for path in files {
            let filename = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };

            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(source = %filename, error = %e, "failed to read file, skipping");
                    continue;
                }
            };

            match self.ingest_document(&bytes, &filename).await {
                Ok(added) => {
                    documents += 1;
                    chunks += added;
                }
                Err(RagError::Extraction { message, .. }) => {
                    warn!(source = %filename, reason = %message, "failed to extract document, skipping");
                }
                Err(e) => return Err(e),
            }
        }

        info!(documents, chunks, "folder ingestion complete");
        Ok((documents, chunks))
    }

    /// Query the index: embed the query and return the `top_k` nearest
    /// chunks by cosine distance, best first.
    pub async fn query(&self, query: &str) -> Result<Vec<SearchResult>> {
        use crate::retriever::RetrievalStrategy;
        self.retriever().retrieve(query, self.config.top_k).await
    }

    /// Remove all entries from the index.
    pub async fn clear(&self) -> Result<()> {
        self.ensure_collection().await?;
        self.store.clear_collection(&self.collection).await
    }

    /// The number of chunks currently indexed.
    pub async fn count(&self) -> Result<usize> {
        self.ensure_collection().await?;
        self.store.count(&self.collection).await
    }

    /// The distinct source documents currently indexed.
    pub async fn sources(&self) -> Result<BTreeSet<String>> {
        self.ensure_collection().await?;
        self.store.sources(&self.collection).await
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All components except `collection` are required.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
    extractor: Option<Arc<dyn PageExtractor>>,
    collection: Option<String>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the page extractor.
    pub fn extractor(mut self, extractor: Arc<dyn PageExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Set the collection name (defaults to `pdf_chunks`).
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    /// Build the [`RagPipeline`], validating that all required components
    /// are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required component is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let store =
            self.store.ok_or_else(|| RagError::Config("vector_store is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;
        let extractor =
            self.extractor.ok_or_else(|| RagError::Config("extractor is required".to_string()))?;

        Ok(RagPipeline {
            config,
            embedder,
            store,
            chunker,
            extractor,
            collection: self.collection.unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
        })
    }
}
