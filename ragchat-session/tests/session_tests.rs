//! End-to-end session behavior: streaming, history commitment, rollback,
//! cancellation, and single-stream enforcement, all against a scripted model.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;

use ragchat_core::{ChatError, Role};
use ragchat_model::MockLlm;
use ragchat_retrieval::{
    DocumentChunk, RagError, RetrievalStrategy, SearchResult, NO_CONTEXT_PLACEHOLDER,
};
use ragchat_session::{
    ChatSession, DEFAULT_SYSTEM_INSTRUCTION, RETRIEVAL_UNAVAILABLE, STOP_MARKER,
};

/// Always returns the same canned results.
struct FixedRetriever {
    results: Vec<SearchResult>,
}

impl FixedRetriever {
    fn empty() -> Self {
        Self { results: Vec::new() }
    }

    fn with_manual_chunk() -> Self {
        let chunk = DocumentChunk::new("Press the red button to reset.", "manual.pdf", 1, 0);
        Self { results: vec![SearchResult { chunk, score: 0.12 }] }
    }
}

#[async_trait]
impl RetrievalStrategy for FixedRetriever {
    async fn retrieve(
        &self,
        _query: &str,
        top_k: usize,
    ) -> ragchat_retrieval::Result<Vec<SearchResult>> {
        Ok(self.results.iter().take(top_k).cloned().collect())
    }
}

/// Fails every retrieval, as if the index backend were down.
struct DownRetriever;

#[async_trait]
impl RetrievalStrategy for DownRetriever {
    async fn retrieve(
        &self,
        _query: &str,
        _top_k: usize,
    ) -> ragchat_retrieval::Result<Vec<SearchResult>> {
        Err(RagError::Index {
            backend: "in-memory".to_string(),
            message: "backend offline".to_string(),
        })
    }
}

fn session_with(llm: Arc<MockLlm>, retriever: Arc<dyn RetrievalStrategy>) -> ChatSession {
    ChatSession::builder().llm(llm).retriever(retriever).build().unwrap()
}

async fn drain(session: &ChatSession, query: &str) -> String {
    let mut stream = session.submit(query).await.unwrap();
    let mut reply = String::new();
    while let Some(token) = stream.next().await {
        reply.push_str(&token.unwrap());
    }
    reply
}

#[tokio::test]
async fn full_turn_commits_user_and_assistant_messages() {
    let llm = Arc::new(MockLlm::new(["Hel", "lo", "!"]));
    let session = session_with(llm.clone(), Arc::new(FixedRetriever::empty()));

    let reply = drain(&session, "hi there").await;
    assert_eq!(reply, "Hello!");

    let history = session.history().await;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].role, Role::System);
    assert_eq!(history[1].role, Role::User);
    assert_eq!(history[1].content, "hi there");
    assert_eq!(history[2].role, Role::Assistant);
    assert_eq!(history[2].content, "Hello!");
}

#[tokio::test]
async fn retrieved_context_is_injected_into_system_turn() {
    let llm = Arc::new(MockLlm::new(["ok"]));
    let session = session_with(llm.clone(), Arc::new(FixedRetriever::with_manual_chunk()));

    drain(&session, "how do I reset it?").await;

    let requests = llm.requests().await;
    assert_eq!(requests.len(), 1);
    let system = &requests[0].messages[0];
    assert_eq!(system.role, Role::System);
    assert!(system.content.starts_with(DEFAULT_SYSTEM_INSTRUCTION));
    assert!(system.content.contains("--- Source: manual.pdf (page 1"));
    assert!(system.content.contains("Press the red button to reset."));
}

#[tokio::test]
async fn empty_retrieval_injects_no_context_placeholder() {
    let llm = Arc::new(MockLlm::new(["ok"]));
    let session = session_with(llm.clone(), Arc::new(FixedRetriever::empty()));

    drain(&session, "anything").await;

    let requests = llm.requests().await;
    assert!(requests[0].messages[0].content.contains(NO_CONTEXT_PLACEHOLDER));
}

#[tokio::test]
async fn retrieval_failure_degrades_to_unavailable_placeholder() {
    let llm = Arc::new(MockLlm::new(["still", " fine"]));
    let session = session_with(llm.clone(), Arc::new(DownRetriever));

    let reply = drain(&session, "anything").await;
    assert_eq!(reply, "still fine");

    let requests = llm.requests().await;
    assert!(requests[0].messages[0].content.contains(RETRIEVAL_UNAVAILABLE));
}

#[tokio::test]
async fn concurrent_submit_is_rejected_until_stream_ends() {
    let llm = Arc::new(MockLlm::new(["a", "b", "c"]));
    let session = session_with(llm.clone(), Arc::new(FixedRetriever::empty()));

    let mut stream = session.submit("first").await.unwrap();
    let _ = stream.next().await;

    let err = session.submit("second").await.unwrap_err();
    assert!(matches!(err, ChatError::Session(_)));

    while stream.next().await.is_some() {}
    drop(stream);

    assert!(session.submit("third").await.is_ok());
}

#[tokio::test]
async fn cancellation_commits_partial_reply_with_marker() {
    let llm = Arc::new(MockLlm::new(["one ", "two ", "three ", "four"]));
    let session = session_with(llm.clone(), Arc::new(FixedRetriever::empty()));

    let mut stream = session.submit("count").await.unwrap();
    let mut seen = String::new();
    seen.push_str(&stream.next().await.unwrap().unwrap());
    seen.push_str(&stream.next().await.unwrap().unwrap());
    assert_eq!(seen, "one two ");

    session.cancel();

    // The flag is honored at the next token boundary, so no further tokens
    // arrive and the stream ends cleanly.
    assert!(stream.next().await.is_none());
    drop(stream);

    let history = session.history().await;
    assert_eq!(history.last().unwrap().role, Role::Assistant);
    assert_eq!(history.last().unwrap().content, format!("one two {STOP_MARKER}"));

    // Cancellation leaves the session ready for the next turn.
    let reply = drain(&session, "again").await;
    assert_eq!(reply, "one two three four");
}

#[tokio::test]
async fn midstream_failure_rolls_back_user_turn() {
    let llm = Arc::new(MockLlm::new(["par", "tial"]).fail_after(1));
    let session = session_with(llm.clone(), Arc::new(FixedRetriever::empty()));

    let mut stream = session.submit("doomed").await.unwrap();
    assert_eq!(stream.next().await.unwrap().unwrap(), "par");
    assert!(stream.next().await.unwrap().is_err());
    assert!(stream.next().await.is_none());
    drop(stream);

    // No partial assistant turn, and the user turn is gone too.
    let history = session.history().await;
    assert!(history.iter().all(|m| m.role == Role::System));

    // The session recovers and the next turn commits normally.
    let mut stream = session.submit("retry").await.unwrap();
    assert_eq!(stream.next().await.unwrap().unwrap(), "par");
}

#[tokio::test]
async fn open_failure_rolls_back_and_releases_session() {
    let llm = Arc::new(MockLlm::new(["never"]).fail_on_open());
    let session = session_with(llm.clone(), Arc::new(FixedRetriever::empty()));

    let err = session.submit("hello").await.unwrap_err();
    assert!(matches!(err, ChatError::Model(_)));
    assert!(session.history().await.iter().all(|m| m.role != Role::User));

    // A Session error here would mean the busy flag leaked.
    let err = session.submit("hello again").await.unwrap_err();
    assert!(matches!(err, ChatError::Model(_)));
}

#[tokio::test]
async fn cancel_when_idle_does_not_affect_next_turn() {
    let llm = Arc::new(MockLlm::new(["full ", "reply"]));
    let session = session_with(llm.clone(), Arc::new(FixedRetriever::empty()));

    session.cancel();
    session.cancel();

    let reply = drain(&session, "go").await;
    assert_eq!(reply, "full reply");
    assert_eq!(session.history().await.last().unwrap().content, "full reply");
}

#[tokio::test]
async fn cancel_racing_stream_teardown_never_pre_cancels_next_turn() {
    let llm = Arc::new(MockLlm::new(["a", "b"]));
    let session = Arc::new(session_with(llm.clone(), Arc::new(FixedRetriever::empty())));

    for _ in 0..50 {
        let mut stream = session.submit("first").await.unwrap();
        let cancel_task = tokio::spawn({
            let session = session.clone();
            async move { session.cancel() }
        });
        while stream.next().await.is_some() {}
        drop(stream);
        cancel_task.await.unwrap();

        // Whether the cancel landed mid-stream or after teardown, it must
        // not leak into the following turn.
        let reply = drain(&session, "second").await;
        assert_eq!(reply, "ab");
        assert_eq!(session.history().await.last().unwrap().content, "ab");

        session.clear_history().await;
    }
}

#[tokio::test]
async fn system_turn_is_rewritten_not_duplicated() {
    let llm = Arc::new(MockLlm::new(["r"]));
    let session = session_with(llm.clone(), Arc::new(FixedRetriever::with_manual_chunk()));

    drain(&session, "first question").await;
    drain(&session, "second question").await;

    let history = session.history().await;
    let system_count = history.iter().filter(|m| m.role == Role::System).count();
    assert_eq!(system_count, 1);
    assert_eq!(history[0].role, Role::System);
    assert_eq!(history.len(), 5);
    assert_eq!(history[3].content, "second question");
}

#[tokio::test]
async fn dropping_stream_midway_releases_session_and_discards_turn() {
    let llm = Arc::new(MockLlm::new(["a", "b", "c"]));
    let session = session_with(llm.clone(), Arc::new(FixedRetriever::empty()));

    let mut stream = session.submit("abandoned").await.unwrap();
    let _ = stream.next().await;
    drop(stream);

    let reply = drain(&session, "fresh").await;
    assert_eq!(reply, "abc");

    // The abandoned turn leaves no trace in the committed history.
    let history = session.history().await;
    assert!(history.iter().all(|m| m.content != "abandoned"));
    assert_eq!(history[1].content, "fresh");
}

#[tokio::test]
async fn clear_history_empties_the_conversation() {
    let llm = Arc::new(MockLlm::new(["r"]));
    let session = session_with(llm.clone(), Arc::new(FixedRetriever::empty()));

    drain(&session, "one turn").await;
    assert!(!session.history().await.is_empty());

    session.clear_history().await;
    assert!(session.history().await.is_empty());
}

#[tokio::test]
async fn builder_rejects_missing_components_and_zero_top_k() {
    let err = ChatSession::builder().build().unwrap_err();
    assert!(matches!(err, ChatError::Config(_)));

    let llm: Arc<MockLlm> = Arc::new(MockLlm::new(["r"]));
    let err = ChatSession::builder().llm(llm.clone()).build().unwrap_err();
    assert!(matches!(err, ChatError::Config(_)));

    let err = ChatSession::builder()
        .llm(llm)
        .retriever(Arc::new(FixedRetriever::empty()))
        .top_k(0)
        .build()
        .unwrap_err();
    assert!(matches!(err, ChatError::Config(_)));
}
