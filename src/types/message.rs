//! Unified conversation message format shared by all backend adapters.

use serde::{Deserialize, Serialize};

/// How many trailing history turns are forwarded to a backend. Older turns
/// are ignored; the gateway never retains history past the call.
pub const HISTORY_WINDOW: usize = 5;

/// A single conversation turn as seen by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// The bounded trailing window of a conversation history.
pub fn recent_window(history: &[Message]) -> &[Message] {
    &history[history.len().saturating_sub(HISTORY_WINDOW)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_keeps_most_recent_turns() {
        let history: Vec<Message> = (0..8).map(|i| Message::user(format!("turn {i}"))).collect();
        let window = recent_window(&history);
        assert_eq!(window.len(), HISTORY_WINDOW);
        assert_eq!(window[0].content, "turn 3");
        assert_eq!(window.last().unwrap().content, "turn 7");
    }

    #[test]
    fn test_window_of_short_history_is_unchanged() {
        let history = vec![Message::user("hi"), Message::assistant("hello")];
        assert_eq!(recent_window(&history).len(), 2);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let msg = Message::assistant("ok");
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["role"], "assistant");
    }
}
