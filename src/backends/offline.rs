//! Terminal fallback backend. Pure local computation over the static
//! knowledge base: always available, never fails, no network.

use crate::knowledge;
use crate::types::message::Message;
use crate::types::{BackendKind, ResponseEnvelope};

use super::ChatBackend;

#[derive(Debug, Default)]
pub struct OfflineBackend;

impl OfflineBackend {
    pub fn new() -> Self {
        Self
    }

    /// Callers sometimes wrap the raw question in a larger prompt scaffold;
    /// answer the inner question when the marker is present.
    fn user_prompt(prompt: &str) -> &str {
        match prompt.split_once("USER INPUT:") {
            Some((_, rest)) => rest.trim_start().lines().next().unwrap_or("").trim(),
            None => prompt,
        }
    }
}

#[async_trait::async_trait]
impl ChatBackend for OfflineBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Offline
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn configure(&self, _credential: &str) {}

    async fn chat(&self, prompt: &str, _history: &[Message], directive: &str) -> ResponseEnvelope {
        let answer = knowledge::respond(Self::user_prompt(prompt), directive);
        ResponseEnvelope::success(self.kind(), answer)
    }
}
