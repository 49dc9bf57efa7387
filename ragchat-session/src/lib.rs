//! # ragchat-session
//!
//! Per-client conversation state for the ragchat assistant: ordered message
//! history with a single rewritable system turn, retrieval-augmented prompt
//! assembly, streaming generation, and cooperative mid-stream cancellation.
//!
//! One [`ChatSession`] belongs to one connected client. Sessions are
//! independent of each other and share only the vector index behind their
//! retrieval strategy.

mod session;

pub use session::{
    ChatSession, ChatSessionBuilder, DEFAULT_SYSTEM_INSTRUCTION, RETRIEVAL_UNAVAILABLE,
    STOP_MARKER,
};
