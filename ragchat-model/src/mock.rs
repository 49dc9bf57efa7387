//! Scripted mock model for tests.

use async_stream::try_stream;
use async_trait::async_trait;
use ragchat_core::{ChatError, ChatRequest, Llm, TokenStream};
use tokio::sync::Mutex;

/// A model backend that replays a scripted token sequence.
///
/// Optionally fails mid-stream after a configured number of tokens, or
/// refuses to open the stream at all, so callers can exercise every
/// termination path deterministically. Requests handed to the mock are
/// recorded for later inspection.
pub struct MockLlm {
    tokens: Vec<String>,
    fail_after: Option<usize>,
    fail_on_open: bool,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockLlm {
    /// A mock that streams the given tokens and ends normally.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            fail_after: None,
            fail_on_open: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail the stream with a generation error after `n` tokens.
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Refuse to open the stream at all.
    pub fn fail_on_open(mut self) -> Self {
        self.fail_on_open = true;
        self
    }

    /// The requests this mock has been asked to generate for.
    pub async fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat_stream(&self, request: ChatRequest) -> ragchat_core::Result<TokenStream> {
        self.requests.lock().await.push(request);

        if self.fail_on_open {
            return Err(ChatError::Model("mock refused to open stream".to_string()));
        }

        let tokens = self.tokens.clone();
        let token_count = tokens.len();
        let fail_after = self.fail_after;

        let stream = try_stream! {
            for (i, token) in tokens.into_iter().enumerate() {
                if fail_after == Some(i) {
                    Err(ChatError::Stream("mock stream failure".to_string()))?;
                }
                // Yield to the scheduler so cancellation between tokens is
                // observable in tests.
                tokio::task::yield_now().await;
                yield token;
            }
            if fail_after.is_some_and(|n| n >= token_count) {
                Err(ChatError::Stream("mock stream failure".to_string()))?;
            }
        };

        Ok(Box::pin(stream))
    }
}
