//! Ollama embedding provider using the local Ollama HTTP API.
//!
//! This module is only available when the `ollama` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The default Ollama host for a local install.
const DEFAULT_HOST: &str = "http://127.0.0.1:11434";

/// The default embedding model.
const DEFAULT_MODEL: &str = "all-minilm";

/// The dimensionality of `all-minilm` embeddings.
const DEFAULT_DIMENSIONS: usize = 384;

/// An [`EmbeddingProvider`] backed by a local Ollama server.
///
/// Uses `reqwest` to call the `/api/embeddings` endpoint directly. Ollama has
/// no batch embedding call, so batches go through the sequential default of
/// [`EmbeddingProvider::embed_batch`].
///
/// # Configuration
///
/// - `host`: from the constructor or the `OLLAMA_HOST` environment variable,
///   defaulting to `http://127.0.0.1:11434`.
/// - `model`: defaults to `all-minilm`.
/// - `dimensions`: must match the chosen model; defaults to 384.
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    host: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbeddingProvider {
    /// Create a new provider against the given host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.into(),
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        }
    }

    /// Create a provider from the `OLLAMA_HOST` environment variable,
    /// defaulting to the local install address.
    pub fn from_env() -> Self {
        let host = std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        Self::new(host)
    }

    /// Set the embedding model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the dimensionality the chosen model produces.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Ollama", model = %self.model, text_len = text.len(), "embedding text");

        let url = format!("{}/api/embeddings", self.host);
        let request_body = EmbeddingRequest { model: &self.model, prompt: text };

        let response =
            self.client.post(&url).json(&request_body).send().await.map_err(|e| {
                error!(provider = "Ollama", error = %e, "request failed");
                RagError::Embedding {
                    provider: "Ollama".into(),
                    message: format!("request to {url} failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "Ollama", %status, "API error");
            return Err(RagError::Embedding {
                provider: "Ollama".into(),
                message: format!("API returned {status}: {body}"),
            });
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "Ollama", error = %e, "failed to parse response");
            RagError::Embedding {
                provider: "Ollama".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        if embedding_response.embedding.is_empty() {
            return Err(RagError::Embedding {
                provider: "Ollama".into(),
                message: "API returned an empty embedding".into(),
            });
        }

        Ok(embedding_response.embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
