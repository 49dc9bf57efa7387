//! Configuration for the Ollama backend.

/// The default host for a local Ollama install.
pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";

/// The default chat model.
const DEFAULT_MODEL: &str = "gemma3:12b";

/// Configuration for [`OllamaClient`](super::OllamaClient).
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    pub host: String,
    /// The model to generate with.
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self { host: DEFAULT_OLLAMA_HOST.to_string(), model: DEFAULT_MODEL.to_string() }
    }
}

impl OllamaConfig {
    /// Create a configuration with an explicit host and model.
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self { host: host.into(), model: model.into() }
    }

    /// Read `OLLAMA_HOST` and `OLLAMA_MODEL` from the environment, keeping
    /// the local-install defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("OLLAMA_HOST").unwrap_or(defaults.host),
            model: std::env::var("OLLAMA_MODEL").unwrap_or(defaults.model),
        }
    }
}
