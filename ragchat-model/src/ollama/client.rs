//! Ollama client implementation.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use ragchat_core::{ChatError, ChatRequest, Llm, TokenStream};
use tracing::{debug, error};

use super::config::OllamaConfig;
use super::wire::{self, ChatRequestBody, StreamEvent};

/// Streaming chat client for a local Ollama server.
pub struct OllamaClient {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OllamaConfig) -> Self {
        Self { client: reqwest::Client::new(), config }
    }

    /// Create a client from `OLLAMA_HOST` / `OLLAMA_MODEL`, with
    /// local-install defaults.
    pub fn from_env() -> Self {
        Self::new(OllamaConfig::from_env())
    }
}

#[async_trait]
impl Llm for OllamaClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn chat_stream(&self, request: ChatRequest) -> ragchat_core::Result<TokenStream> {
        let url = format!("{}/api/chat", self.config.host);
        let body = ChatRequestBody {
            model: &self.config.model,
            messages: &request.messages,
            stream: true,
        };

        debug!(model = %self.config.model, messages = request.messages.len(), "opening chat stream");

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            error!(url, error = %e, "chat request failed");
            ChatError::Model(format!("request to {url} failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(url, %status, "chat request rejected");
            return Err(ChatError::Model(format!("API returned {status}: {detail}")));
        }

        let mut bytes = response.bytes_stream();

        let stream = try_stream! {
            let mut buffer = String::new();
            let mut done = false;

            while !done {
                let Some(part) = bytes.next().await else { break };
                let part = part
                    .map_err(|e| ChatError::Stream(format!("transport error: {e}")))?;
                buffer.push_str(&String::from_utf8_lossy(&part));

                // NDJSON framing: emit every complete line in the buffer.
                while let Some(pos) = buffer.find('\n') {
                    let line: String = buffer.drain(..=pos).collect();
                    match wire::decode_line(&line)? {
                        StreamEvent::Done => {
                            done = true;
                            break;
                        }
                        StreamEvent::Token(token) if !token.is_empty() => yield token,
                        StreamEvent::Token(_) => {}
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
