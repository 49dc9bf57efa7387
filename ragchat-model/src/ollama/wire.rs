//! Wire types and line decoding for the Ollama chat stream.

use ragchat_core::{ChatError, Message};
use serde::{Deserialize, Serialize};

/// Request body for `POST /api/chat`.
#[derive(Serialize)]
pub(super) struct ChatRequestBody<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub stream: bool,
}

#[derive(Deserialize)]
struct ChatStreamLine {
    #[serde(default)]
    message: Option<StreamMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct StreamMessage {
    content: String,
}

/// One decoded event from the NDJSON stream.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum StreamEvent {
    /// The next fragment of assistant text (possibly empty).
    Token(String),
    /// The server signalled the end of generation.
    Done,
}

/// Decode one NDJSON line from the chat stream.
///
/// Blank lines decode to an empty token. A line carrying an `error` field or
/// that is not valid JSON fails with [`ChatError::Stream`].
pub(super) fn decode_line(line: &str) -> Result<StreamEvent, ChatError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(StreamEvent::Token(String::new()));
    }

    let parsed: ChatStreamLine = serde_json::from_str(line)
        .map_err(|e| ChatError::Stream(format!("malformed stream line: {e}")))?;

    if let Some(error) = parsed.error {
        return Err(ChatError::Stream(error));
    }
    if parsed.done {
        return Ok(StreamEvent::Done);
    }

    Ok(StreamEvent::Token(parsed.message.map(|m| m.content).unwrap_or_default()))
}
