//! 后端适配层 — 将各厂商的传输协议归一化为统一的聊天契约
//!
//! Backend adapter layer. One adapter per backend kind normalizes that
//! vendor's transport into the uniform chat contract; the closed [`Backend`]
//! enum dispatches over them exhaustively, so adding a kind is a compile
//! error everywhere it matters rather than a runtime surprise.

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod offline;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::types::message::{recent_window, Message, MessageRole};
use crate::types::{BackendKind, ResponseEnvelope};

pub use anthropic::AnthropicBackend;
pub use gemini::GeminiBackend;
pub use offline::OfflineBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

/// Uniform contract every backend adapter implements.
///
/// All methods take `&self`: mutable adapter state (credentials, targets) is
/// swapped atomically so `configure` is never observed half-written by an
/// in-flight `chat`.
#[async_trait]
pub trait ChatBackend {
    fn kind(&self) -> BackendKind;

    /// Cheap, side-effect-free availability probe. Must never panic; any
    /// transport fault converts to `false`.
    async fn is_available(&self) -> bool;

    /// Replace the stored credential (or target, for Ollama) without
    /// validating it against the network.
    fn configure(&self, credential: &str);

    /// One bounded completion attempt. Every failure is a failure envelope;
    /// this never panics and never bubbles an error type.
    async fn chat(&self, prompt: &str, history: &[Message], directive: &str) -> ResponseEnvelope;
}

/// Closed set of adapter instances, one variant per [`BackendKind`].
#[derive(Debug)]
pub enum Backend {
    Gemini(GeminiBackend),
    OpenAi(OpenAiBackend),
    Anthropic(AnthropicBackend),
    Ollama(OllamaBackend),
    Offline(OfflineBackend),
}

#[async_trait]
impl ChatBackend for Backend {
    fn kind(&self) -> BackendKind {
        match self {
            Backend::Gemini(b) => b.kind(),
            Backend::OpenAi(b) => b.kind(),
            Backend::Anthropic(b) => b.kind(),
            Backend::Ollama(b) => b.kind(),
            Backend::Offline(b) => b.kind(),
        }
    }

    async fn is_available(&self) -> bool {
        match self {
            Backend::Gemini(b) => b.is_available().await,
            Backend::OpenAi(b) => b.is_available().await,
            Backend::Anthropic(b) => b.is_available().await,
            Backend::Ollama(b) => b.is_available().await,
            Backend::Offline(b) => b.is_available().await,
        }
    }

    fn configure(&self, credential: &str) {
        match self {
            Backend::Gemini(b) => b.configure(credential),
            Backend::OpenAi(b) => b.configure(credential),
            Backend::Anthropic(b) => b.configure(credential),
            Backend::Ollama(b) => b.configure(credential),
            Backend::Offline(b) => b.configure(credential),
        }
    }

    async fn chat(&self, prompt: &str, history: &[Message], directive: &str) -> ResponseEnvelope {
        match self {
            Backend::Gemini(b) => b.chat(prompt, history, directive).await,
            Backend::OpenAi(b) => b.chat(prompt, history, directive).await,
            Backend::Anthropic(b) => b.chat(prompt, history, directive).await,
            Backend::Ollama(b) => b.chat(prompt, history, directive).await,
            Backend::Offline(b) => b.chat(prompt, history, directive).await,
        }
    }
}

/// Build an OpenAI-style `messages` array: leading system directive, bounded
/// history window, then the user prompt. Shared by the OpenAI and Ollama
/// adapters, which speak the same message shape.
pub(crate) fn chat_messages(prompt: &str, history: &[Message], directive: &str) -> Vec<Value> {
    let mut messages = Vec::with_capacity(recent_window(history).len() + 2);
    if !directive.is_empty() {
        messages.push(json!({ "role": "system", "content": directive }));
    }
    for turn in recent_window(history) {
        messages.push(json!({ "role": turn.role, "content": turn.content }));
    }
    messages.push(json!({ "role": "user", "content": prompt }));
    messages
}

/// History turns as `user`/`assistant` pairs with the system role folded into
/// the assistant side. Used by adapters whose schema carries the directive in
/// a dedicated top-level field.
pub(crate) fn dialogue_messages(prompt: &str, history: &[Message]) -> Vec<Value> {
    let mut messages = Vec::with_capacity(recent_window(history).len() + 1);
    for turn in recent_window(history) {
        let role = match turn.role {
            MessageRole::User => "user",
            _ => "assistant",
        };
        messages.push(json!({ "role": role, "content": turn.content }));
    }
    messages.push(json!({ "role": "user", "content": prompt }));
    messages
}
