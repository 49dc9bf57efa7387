//! The model backend trait and its streaming output type.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::Result;
use crate::message::ChatRequest;

/// A finite stream of output text fragments from one generation.
///
/// Each item is either the next fragment of assistant text or the error that
/// terminated the stream. The stream is not restartable; callers re-run the
/// whole request to generate again.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A chat model backend capable of streaming generation.
///
/// Implementations wrap a specific serving endpoint (Ollama, an
/// OpenAI-compatible server, a scripted mock) behind one async interface.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat_core::{ChatRequest, Llm, Message};
/// use futures::StreamExt;
///
/// let mut stream = model.chat_stream(ChatRequest::new(vec![Message::user("hi")])).await?;
/// while let Some(token) = stream.next().await {
///     print!("{}", token?);
/// }
/// ```
#[async_trait]
pub trait Llm: Send + Sync {
    /// The model identifier this backend generates with.
    fn name(&self) -> &str;

    /// Open a streaming generation for the given conversation.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Model`](crate::ChatError::Model) if the request
    /// cannot be opened. Failures after the stream is open are yielded
    /// through the stream as [`ChatError::Stream`](crate::ChatError::Stream).
    async fn chat_stream(&self, request: ChatRequest) -> Result<TokenStream>;
}
