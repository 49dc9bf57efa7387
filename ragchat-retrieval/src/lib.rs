//! # ragchat-retrieval
//!
//! The retrieval half of the ragchat pipeline: paragraph-aware chunking,
//! embedding generation, vector indexing with similarity search, a
//! keyword-overlap fallback strategy, and the ingestion pipeline that ties
//! them together.
//!
//! ## Overview
//!
//! Ingestion runs `extract pages → chunk → embed → upsert`, tagging every
//! chunk with its provenance (source document, page number, per-document
//! sequence). Retrieval embeds a query and asks the store for the `top_k`
//! nearest chunks by cosine distance, or, with [`KeywordRetriever`], ranks
//! in-memory line chunks by query-word overlap with no embedding step at all.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragchat_retrieval::{
//!     InMemoryVectorStore, ParagraphChunker, RagConfig, RagPipeline,
//! };
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .chunker(Arc::new(ParagraphChunker::new(1000, 200)))
//!     .extractor(Arc::new(extractor))
//!     .collection("pdf_chunks")
//!     .build()?;
//!
//! pipeline.ingest_folder("data_pdfs", true).await?;
//! let results = pipeline.query("what does chapter 2 say?").await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod inmemory;
#[cfg(feature = "ollama")]
pub mod ollama;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod pipeline;
pub mod retriever;
pub mod vectorstore;

pub use chunking::{Chunker, ParagraphChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{DocumentChunk, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::{PageExtractor, PageText};
pub use inmemory::InMemoryVectorStore;
#[cfg(feature = "ollama")]
pub use ollama::OllamaEmbeddingProvider;
#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use retriever::{
    format_context, KeywordRetriever, RetrievalStrategy, VectorRetriever, NO_CONTEXT_PLACEHOLDER,
};
pub use vectorstore::VectorStore;
