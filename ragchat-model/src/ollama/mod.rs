//! Ollama chat backend.
//!
//! Ollama streams newline-delimited JSON rather than SSE, so the client
//! frames lines by hand over a `reqwest` byte stream and decodes each line
//! with a small, separately testable parser.

mod client;
mod config;
mod wire;

pub use client::OllamaClient;
pub use config::{OllamaConfig, DEFAULT_OLLAMA_HOST};
