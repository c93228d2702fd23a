//! Anthropic Messages API 适配器 — 实现 Anthropic 特有的请求/响应格式转换
//!
//! Anthropic adapter. Key differences from the OpenAI shape:
//! - The directive is a top-level `system` parameter, never in `messages`.
//! - `max_tokens` is required, not optional.
//! - Auth rides in `x-api-key` plus a pinned `anthropic-version` header.
//! - Response text lives at `content[0].text`.

use arc_swap::ArcSwapOption;
use serde_json::{json, Value};

use crate::error::BackendError;
use crate::transport::{self, HttpClients};
use crate::types::message::Message;
use crate::types::{BackendKind, ResponseEnvelope};

use super::{dialogue_messages, ChatBackend};

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20240620";
const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug)]
pub struct AnthropicBackend {
    api_key: ArcSwapOption<String>,
    endpoint: String,
    http: reqwest::Client,
}

impl AnthropicBackend {
    pub fn from_env(http: &HttpClients, endpoint: Option<String>) -> Self {
        Self {
            api_key: ArcSwapOption::from_pointee(transport::lookup_credential("anthropic")),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            http: http.chat.clone(),
        }
    }

    fn request_body(prompt: &str, history: &[Message], directive: &str) -> Value {
        let mut body = json!({
            "model": DEFAULT_ANTHROPIC_MODEL,
            "max_tokens": MAX_TOKENS,
            "messages": dialogue_messages(prompt, history),
        });
        if !directive.is_empty() {
            body["system"] = Value::String(directive.to_string());
        }
        body
    }
}

#[async_trait::async_trait]
impl ChatBackend for AnthropicBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Anthropic
    }

    async fn is_available(&self) -> bool {
        self.api_key.load().is_some()
    }

    fn configure(&self, credential: &str) {
        self.api_key.store(Some(credential.to_string().into()));
    }

    async fn chat(&self, prompt: &str, history: &[Message], directive: &str) -> ResponseEnvelope {
        let Some(key) = self.api_key.load_full() else {
            return ResponseEnvelope::failure(self.kind(), BackendError::MissingCredential);
        };

        let url = format!("{}/v1/messages", self.endpoint);
        let body = Self::request_body(prompt, history, directive);

        let resp = match self
            .http
            .post(&url)
            .header("x-api-key", key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                return ResponseEnvelope::failure(
                    self.kind(),
                    BackendError::Transport(e.to_string()),
                )
            }
        };

        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();

        if status == 200 {
            let content = serde_json::from_str::<Value>(&text).ok().and_then(|v| {
                v.pointer("/content/0/text")
                    .and_then(|t| t.as_str())
                    .map(String::from)
            });
            match content {
                Some(content) => ResponseEnvelope::success(self.kind(), content),
                None => ResponseEnvelope::failure(self.kind(), BackendError::MalformedResponse),
            }
        } else {
            ResponseEnvelope::failure(self.kind(), BackendError::from_status(status, text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::message::MessageRole;

    #[test]
    fn test_request_body_keeps_directive_out_of_messages() {
        let history = vec![Message::user("q"), Message::assistant("a")];
        let body = AnthropicBackend::request_body("next", &history, "be brief");
        assert_eq!(body["system"], "be brief");
        assert_eq!(body["max_tokens"], MAX_TOKENS);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m["role"] != "system"));
    }

    #[test]
    fn test_request_body_without_directive_omits_system() {
        let body = AnthropicBackend::request_body("hi", &[], "");
        assert!(body.get("system").is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_chat_reports_missing_credential() {
        let b = AnthropicBackend::from_env(&HttpClients::new().unwrap(), None);
        b.api_key.store(None);
        let env = b
            .chat("hi", &[Message { role: MessageRole::User, content: "x".into() }], "")
            .await;
        assert_eq!(env.error, Some(BackendError::MissingCredential));
        assert_eq!(env.origin, BackendKind::Anthropic);
    }
}
