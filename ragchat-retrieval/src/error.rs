//! Error types for the `ragchat-retrieval` crate.

use thiserror::Error;

/// Errors that can occur during ingestion and retrieval.
#[derive(Debug, Error)]
pub enum RagError {
    /// A document could not be parsed into pages at all.
    ///
    /// Single-page extraction failures are not errors: they are logged and
    /// the page is skipped so the rest of the document still ingests.
    #[error("Extraction error ({source_document}): {message}")]
    Extraction {
        /// The document that failed to parse.
        source_document: String,
        /// A description of the failure.
        message: String,
    },

    /// The embedding backend was unreachable or returned malformed output.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error in the vector index backend.
    #[error("Index error ({backend}): {message}")]
    Index {
        /// The index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
