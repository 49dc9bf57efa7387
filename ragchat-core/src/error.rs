//! Error types shared across the ragchat workspace.

use thiserror::Error;

/// Errors produced by model backends and conversation sessions.
///
/// Retrieval and ingestion have their own taxonomy in `ragchat-retrieval`;
/// a retrieval failure during a chat turn is degraded to a placeholder
/// context string by the session rather than surfaced through this type.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The model backend rejected or failed to open a request
    /// (connection refused, bad status, malformed request).
    #[error("Model error: {0}")]
    Model(String),

    /// The model's token stream failed after it was opened.
    #[error("Stream error: {0}")]
    Stream(String),

    /// Session protocol misuse, e.g. submitting a query while a previous
    /// stream is still live.
    #[error("Session error: {0}")]
    Session(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
