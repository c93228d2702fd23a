//! Google Gemini generateContent 适配器 — 处理 Gemini 特有的请求/响应格式
//!
//! Gemini adapter. Key differences from the OpenAI shape:
//! - `contents` with `parts`, roles `user`/`model` (not `assistant`).
//! - The directive rides in a top-level `system_instruction` (v1beta).
//! - The API key is a `?key=` query parameter, not a header.
//! - Response text lives at `candidates[0].content.parts[0].text`.

use arc_swap::ArcSwapOption;
use serde_json::{json, Value};

use crate::error::BackendError;
use crate::transport::{self, HttpClients};
use crate::types::message::{recent_window, Message, MessageRole};
use crate::types::{BackendKind, ResponseEnvelope};

use super::ChatBackend;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Credential snapshot. Key and target model swap together so a `configure`
/// mid-request is either fully old or fully new.
#[derive(Debug)]
struct GeminiAuth {
    key: String,
    model: String,
}

#[derive(Debug)]
pub struct GeminiBackend {
    auth: ArcSwapOption<GeminiAuth>,
    endpoint: String,
    http: reqwest::Client,
}

impl GeminiBackend {
    pub fn from_env(http: &HttpClients, endpoint: Option<String>) -> Self {
        let auth = transport::lookup_credential("gemini").map(|key| GeminiAuth {
            key,
            model: DEFAULT_GEMINI_MODEL.to_string(),
        });
        Self {
            auth: ArcSwapOption::from_pointee(auth),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            http: http.chat.clone(),
        }
    }

    fn request_body(prompt: &str, history: &[Message], directive: &str) -> Value {
        let mut contents: Vec<Value> = recent_window(history)
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    MessageRole::User => "user",
                    _ => "model",
                };
                json!({ "role": role, "parts": [{ "text": turn.content }] })
            })
            .collect();
        contents.push(json!({ "role": "user", "parts": [{ "text": prompt }] }));

        let mut body = json!({ "contents": contents });
        if !directive.is_empty() {
            body["system_instruction"] = json!({ "parts": [{ "text": directive }] });
        }
        body
    }

    /// Pull the human-readable message out of a Gemini error body, if any.
    fn error_detail(text: &str) -> String {
        serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| text.to_string())
    }
}

#[async_trait::async_trait]
impl ChatBackend for GeminiBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gemini
    }

    async fn is_available(&self) -> bool {
        self.auth.load().is_some()
    }

    fn configure(&self, credential: &str) {
        // A `key|model` credential selects the target model as well.
        let auth = match credential.split_once('|') {
            Some((key, model)) => GeminiAuth {
                key: key.to_string(),
                model: model.to_string(),
            },
            None => GeminiAuth {
                key: credential.to_string(),
                model: DEFAULT_GEMINI_MODEL.to_string(),
            },
        };
        self.auth.store(Some(auth.into()));
    }

    async fn chat(&self, prompt: &str, history: &[Message], directive: &str) -> ResponseEnvelope {
        let Some(auth) = self.auth.load_full() else {
            return ResponseEnvelope::failure(self.kind(), BackendError::MissingCredential);
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint, auth.model, auth.key
        );
        let body = Self::request_body(prompt, history, directive);

        let resp = match self.http.post(&url).json(&body).send().await {
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

        match status {
            200 => {
                let content = serde_json::from_str::<Value>(&text).ok().and_then(|v| {
                    v.pointer("/candidates/0/content/parts/0/text")
                        .and_then(|t| t.as_str())
                        .map(String::from)
                });
                match content {
                    Some(content) => ResponseEnvelope::success(self.kind(), content),
                    None => {
                        ResponseEnvelope::failure(self.kind(), BackendError::MalformedResponse)
                    }
                }
            }
            429 => ResponseEnvelope::failure(
                self.kind(),
                BackendError::RateLimited {
                    detail: "quota exceeded; new keys can take ~10 minutes to activate. \
                             Tip: install Ollama (https://ollama.com) for unmetered local \
                             completions"
                        .to_string(),
                },
            ),
            status => ResponseEnvelope::failure(
                self.kind(),
                BackendError::Http {
                    status,
                    detail: Self::error_detail(&text),
                },
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> GeminiBackend {
        GeminiBackend::from_env(&HttpClients::new().unwrap(), None)
    }

    #[tokio::test]
    async fn test_unconfigured_backend_is_unavailable() {
        let b = backend();
        b.auth.store(None); // independent of the test environment
        assert!(!b.is_available().await);
        let env = b.chat("hi", &[], "").await;
        assert!(!env.success);
        assert_eq!(env.error, Some(BackendError::MissingCredential));
    }

    #[tokio::test]
    async fn test_configure_splits_key_and_model() {
        let b = backend();
        b.configure("secret|gemini-2.5-pro");
        let auth = b.auth.load_full().unwrap();
        assert_eq!(auth.key, "secret");
        assert_eq!(auth.model, "gemini-2.5-pro");
        assert!(b.is_available().await);
    }

    #[test]
    fn test_request_body_shape() {
        let history = vec![Message::user("q"), Message::assistant("a")];
        let body = GeminiBackend::request_body("next", &history, "be terse");
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "next");
        assert_eq!(body["system_instruction"]["parts"][0]["text"], "be terse");
    }

    #[test]
    fn test_error_detail_prefers_nested_message() {
        let detail =
            GeminiBackend::error_detail(r#"{"error":{"code":400,"message":"bad key"}}"#);
        assert_eq!(detail, "bad key");
        assert_eq!(GeminiBackend::error_detail("plain text"), "plain text");
    }
}
