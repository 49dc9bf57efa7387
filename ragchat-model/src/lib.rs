//! # ragchat-model
//!
//! Chat model backends implementing the [`ragchat_core::Llm`] trait.
//!
//! - [`OllamaClient`]: streams tokens from a local Ollama server's
//!   `/api/chat` endpoint (`ollama` feature, default on).
//! - [`MockLlm`]: scripted token stream for tests, with optional injected
//!   mid-stream failure.

pub mod mock;
#[cfg(feature = "ollama")]
pub mod ollama;

pub use mock::MockLlm;
#[cfg(feature = "ollama")]
pub use ollama::{OllamaClient, OllamaConfig};
