//! Ollama local-poll adapter. Unlike the keyed cloud backends, availability
//! means an actual daemon answering on the configured address, so the probe
//! is a bounded network round-trip, and `configure` replaces the base URL
//! rather than an API key.

use arc_swap::ArcSwap;
use serde_json::{json, Value};
use url::Url;

use crate::error::BackendError;
use crate::transport::HttpClients;
use crate::types::message::Message;
use crate::types::{BackendKind, ResponseEnvelope};

use super::{chat_messages, ChatBackend};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const FALLBACK_MODEL: &str = "llama3";

#[derive(Debug)]
pub struct OllamaBackend {
    base_url: ArcSwap<String>,
    chat_http: reqwest::Client,
    probe_http: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(http: &HttpClients, base_url: Option<String>) -> Self {
        Self {
            base_url: ArcSwap::from_pointee(
                base_url.unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            ),
            chat_http: http.chat.clone(),
            probe_http: http.probe.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        let base = self.base_url.load_full();
        Url::parse(&base)
            .and_then(|u| u.join(path))
            .map_err(|e| BackendError::Transport(format!("invalid base url '{base}': {e}")))
    }

    /// Names of the models the daemon currently exposes, probe-bounded.
    async fn installed_models(&self) -> Option<Vec<String>> {
        let url = self.endpoint("/api/tags").ok()?;
        let resp = self.probe_http.get(url).send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let body: Value = resp.json().await.ok()?;
        let names = body
            .get("models")?
            .as_array()?
            .iter()
            .filter_map(|m| m.get("name").and_then(|n| n.as_str()))
            .map(String::from)
            .collect();
        Some(names)
    }

    /// First reasonable default when several models are exposed: a llama3
    /// family tag if present, else whatever is listed first.
    fn pick_model(names: &[String]) -> String {
        names
            .iter()
            .find(|n| n.starts_with(FALLBACK_MODEL))
            .or_else(|| names.first())
            .cloned()
            .unwrap_or_else(|| FALLBACK_MODEL.to_string())
    }
}

#[async_trait::async_trait]
impl ChatBackend for OllamaBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Ollama
    }

    /// Available when the daemon answers the tags endpoint and has at least
    /// one model pulled. Any transport fault converts to `false`.
    async fn is_available(&self) -> bool {
        matches!(self.installed_models().await, Some(names) if !names.is_empty())
    }

    /// The "credential" for a local daemon is its address.
    fn configure(&self, credential: &str) {
        let url = credential.trim_end_matches('/').to_string();
        self.base_url.store(url.into());
    }

    async fn chat(&self, prompt: &str, history: &[Message], directive: &str) -> ResponseEnvelope {
        let model = Self::pick_model(&self.installed_models().await.unwrap_or_default());

        let url = match self.endpoint("/api/chat") {
            Ok(url) => url,
            Err(e) => return ResponseEnvelope::failure(self.kind(), e),
        };
        let body = json!({
            "model": model,
            "messages": chat_messages(prompt, history, directive),
            "stream": false,
        });

        let resp = match self.chat_http.post(url).json(&body).send().await {
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
                v.pointer("/message/content")
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

    #[test]
    fn test_pick_model_prefers_llama3_family() {
        let names = vec!["mistral:7b".to_string(), "llama3:8b".to_string()];
        assert_eq!(OllamaBackend::pick_model(&names), "llama3:8b");
    }

    #[test]
    fn test_pick_model_falls_back_to_first_listed() {
        let names = vec!["mistral:7b".to_string(), "phi3:mini".to_string()];
        assert_eq!(OllamaBackend::pick_model(&names), "mistral:7b");
    }

    #[test]
    fn test_pick_model_with_empty_list() {
        assert_eq!(OllamaBackend::pick_model(&[]), FALLBACK_MODEL);
    }

    #[tokio::test]
    async fn test_probe_converts_refused_connection_to_false() {
        let b = OllamaBackend::new(&HttpClients::new().unwrap(), None);
        // Reserved port with nothing listening.
        b.configure("http://127.0.0.1:9");
        assert!(!b.is_available().await);
    }

    #[tokio::test]
    async fn test_probe_survives_garbage_base_url() {
        let b = OllamaBackend::new(&HttpClients::new().unwrap(), None);
        b.configure("not a url at all");
        assert!(!b.is_available().await);
        let env = b.chat("hi", &[], "").await;
        assert!(!env.success);
        assert_eq!(env.origin, BackendKind::Ollama);
    }

    #[test]
    fn test_configure_trims_trailing_slash() {
        let b = OllamaBackend::new(&HttpClients::new().unwrap(), None);
        b.configure("http://10.0.0.5:11434/");
        assert_eq!(**b.base_url.load(), "http://10.0.0.5:11434");
    }
}
