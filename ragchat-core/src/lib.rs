//! # ragchat-core
//!
//! Shared building blocks for the ragchat workspace: conversation message
//! types, the [`Llm`] trait that model backends implement, the [`ChatError`]
//! taxonomy, and tracing bootstrap.
//!
//! Model backends live in `ragchat-model`, retrieval in `ragchat-retrieval`,
//! and the per-client conversation state machine in `ragchat-session`.

pub mod error;
pub mod message;
pub mod model;
pub mod telemetry;

pub use error::{ChatError, Result};
pub use message::{ChatRequest, Message, Role};
pub use model::{Llm, TokenStream};
