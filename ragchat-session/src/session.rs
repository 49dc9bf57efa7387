//! The conversation session and its streaming generator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_stream::try_stream;
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use ragchat_core::{ChatError, ChatRequest, Llm, Message, Result, Role, TokenStream};
use ragchat_retrieval::{format_context, RetrievalStrategy};

/// Marker appended to a partial reply when the user stops generation.
pub const STOP_MARKER: &str = " [stopped by user]";

/// Context substituted when the retrieval strategy itself fails.
pub const RETRIEVAL_UNAVAILABLE: &str = "Context retrieval is currently unavailable.";

/// Default standing instruction for the assistant.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a helpful, professional, and highly capable assistant. \
     You answer clearly and concisely, and you may use the provided document context.";

struct SessionInner {
    llm: Arc<dyn Llm>,
    retriever: Arc<dyn RetrievalStrategy>,
    system_instruction: String,
    top_k: usize,
    history: Mutex<Vec<Message>>,
    /// True while a submitted stream is live; one query at a time.
    busy: AtomicBool,
    /// Cooperative cancellation flag, polled before each token.
    cancelled: AtomicBool,
}

/// Releases the session when a turn's stream is dropped or finishes, so an
/// abandoned stream cannot wedge the session. Also clears any cancellation
/// request that was never consumed, so the next turn is not pre-cancelled.
struct TurnGuard {
    inner: Arc<SessionInner>,
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        self.inner.cancelled.store(false, Ordering::SeqCst);
        self.inner.busy.store(false, Ordering::SeqCst);
    }
}

/// A single client's conversation with the assistant.
///
/// Each submitted query runs retrieval, rewrites the system turn with fresh
/// context, appends the user turn, and streams the model's reply. The
/// assistant turn is committed to history when the stream ends normally, as
/// a partial-plus-marker when cancelled, and not at all on failure; in
/// which case the user turn is rolled back so history never ends on an
/// unanswered user message.
pub struct ChatSession {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("llm", &self.inner.llm.name())
            .field("top_k", &self.inner.top_k)
            .finish_non_exhaustive()
    }
}

impl ChatSession {
    /// Create a new [`ChatSessionBuilder`].
    pub fn builder() -> ChatSessionBuilder {
        ChatSessionBuilder::default()
    }

    /// Submit a user query and open the reply stream.
    ///
    /// The returned stream is finite and not restartable; a new call re-runs
    /// retrieval. Retrieval failure does not fail the turn; the system turn
    /// gets the [`RETRIEVAL_UNAVAILABLE`] placeholder instead of context.
    ///
    /// # Errors
    ///
    /// [`ChatError::Session`] if a previous stream is still live, or
    /// [`ChatError::Model`] if the model stream cannot be opened (the user
    /// turn is rolled back first).
    pub async fn submit(&self, query: &str) -> Result<TokenStream> {
        if self
            .inner
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ChatError::Session(
                "a response is already streaming for this session".to_string(),
            ));
        }
        // A cancel() racing the previous turn's teardown can land after that
        // turn's guard already reset the flags; start from a clean slate so
        // the stale request cannot cancel this turn.
        self.inner.cancelled.store(false, Ordering::SeqCst);
        let guard = TurnGuard { inner: self.inner.clone() };

        let context = match self.inner.retriever.retrieve(query, self.inner.top_k).await {
            Ok(results) => format_context(&results),
            Err(e) => {
                warn!(error = %e, "retrieval failed, substituting placeholder context");
                RETRIEVAL_UNAVAILABLE.to_string()
            }
        };

        // Rewrite the system turn with this query's context and append the
        // user turn. The system slot is regenerated, never appended to, so
        // stale context can't accumulate across turns.
        let request = {
            let mut history = self.inner.history.lock().await;
            // A stream dropped before completion leaves its user turn
            // unanswered; discard it before starting the new turn.
            if history.last().is_some_and(|m| m.role == Role::User) {
                history.pop();
            }
            let system = format!("{}\n\n{}", self.inner.system_instruction, context);
            match history.first_mut() {
                Some(first) if first.role == Role::System => first.content = system,
                _ => history.insert(0, Message::system(system)),
            }
            history.push(Message::user(query));
            ChatRequest::new(history.clone())
        };

        let mut upstream = match self.inner.llm.chat_stream(request).await {
            Ok(stream) => stream,
            Err(e) => {
                self.inner.history.lock().await.pop();
                return Err(e);
            }
        };

        let inner = self.inner.clone();
        let stream = try_stream! {
            let _guard = guard;
            let mut reply = String::new();

            loop {
                // Poll the cancellation flag before pulling the next token;
                // consuming it resets it for the next turn.
                if inner.cancelled.swap(false, Ordering::SeqCst) {
                    let mut history = inner.history.lock().await;
                    history.push(Message::assistant(format!("{reply}{STOP_MARKER}")));
                    info!(reply_len = reply.len(), "generation cancelled, partial reply committed");
                    break;
                }

                match upstream.next().await {
                    Some(Ok(token)) => {
                        reply.push_str(&token);
                        yield token;
                    }
                    Some(Err(e)) => {
                        // Roll back the user turn so history reverts to its
                        // pre-submission shape.
                        let mut history = inner.history.lock().await;
                        if history.last().is_some_and(|m| m.role == Role::User) {
                            history.pop();
                        }
                        drop(history);
                        warn!(error = %e, "stream failed, user turn rolled back");
                        Err(e)?;
                    }
                    None => {
                        let mut history = inner.history.lock().await;
                        history.push(Message::assistant(reply.clone()));
                        debug!(reply_len = reply.len(), "reply committed");
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    /// Request cancellation of the live stream, if any.
    ///
    /// Idempotent; a no-op when nothing is streaming. Generation stops at
    /// the next token boundary and the partial reply is committed with
    /// [`STOP_MARKER`] appended.
    pub fn cancel(&self) {
        if self.inner.busy.load(Ordering::SeqCst) {
            self.inner.cancelled.store(true, Ordering::SeqCst);
        }
    }

    /// A read-only snapshot of the conversation history.
    pub async fn history(&self) -> Vec<Message> {
        self.inner.history.lock().await.clone()
    }

    /// Drop the whole conversation, e.g. after the index is re-ingested and
    /// old retrieved-context references would be stale.
    pub async fn clear_history(&self) {
        self.inner.history.lock().await.clear();
    }
}

/// Builder for constructing a [`ChatSession`].
#[derive(Default)]
pub struct ChatSessionBuilder {
    llm: Option<Arc<dyn Llm>>,
    retriever: Option<Arc<dyn RetrievalStrategy>>,
    system_instruction: Option<String>,
    top_k: Option<usize>,
}

impl ChatSessionBuilder {
    /// Set the model backend.
    pub fn llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Set the retrieval strategy.
    pub fn retriever(mut self, retriever: Arc<dyn RetrievalStrategy>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Set the standing instruction (defaults to
    /// [`DEFAULT_SYSTEM_INSTRUCTION`]).
    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Set how many retrieved chunks to inject per turn (defaults to 5).
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Build the [`ChatSession`], validating required components.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if the llm or retriever is missing, or
    /// if `top_k` is zero.
    pub fn build(self) -> Result<ChatSession> {
        let llm = self.llm.ok_or_else(|| ChatError::Config("llm is required".to_string()))?;
        let retriever =
            self.retriever.ok_or_else(|| ChatError::Config("retriever is required".to_string()))?;
        let top_k = self.top_k.unwrap_or(5);
        if top_k == 0 {
            return Err(ChatError::Config("top_k must be greater than zero".to_string()));
        }

        Ok(ChatSession {
            inner: Arc::new(SessionInner {
                llm,
                retriever,
                system_instruction: self
                    .system_instruction
                    .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string()),
                top_k,
                history: Mutex::new(Vec::new()),
                busy: AtomicBool::new(false),
                cancelled: AtomicBool::new(false),
            }),
        })
    }
}
