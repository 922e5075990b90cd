//! Conversation and stream-protocol message types

use serde::{Deserialize, Serialize};

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of conversation history. Caller-owned and passed by value per
/// relay call; the core keeps no conversation state between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One decoded frame from the answer stream. Dispatched to the caller and
/// discarded; never buffered across frames.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental answer text
    ContentDelta(String),
    /// End-of-stream sentinel
    Done,
    /// Valid JSON of an event kind this client does not handle
    Unrecognized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format() {
        let msg = ChatMessage::user("How do I print a quote?");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""role":"user""#));

        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_assistant_constructor() {
        let msg = ChatMessage::assistant("Open the quote and press Ctrl+P.");
        assert_eq!(msg.role, Role::Assistant);
    }
}
