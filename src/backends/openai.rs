//! OpenAI chat-completions adapter. The baseline message shape: `messages`
//! array with a leading system turn, bearer auth, response text at
//! `choices[0].message.content`.

use arc_swap::ArcSwapOption;
use serde_json::{json, Value};

use crate::error::BackendError;
use crate::transport::{self, HttpClients};
use crate::types::message::Message;
use crate::types::{BackendKind, ResponseEnvelope};

use super::{chat_messages, ChatBackend};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

#[derive(Debug)]
pub struct OpenAiBackend {
    api_key: ArcSwapOption<String>,
    endpoint: String,
    http: reqwest::Client,
}

impl OpenAiBackend {
    pub fn from_env(http: &HttpClients, endpoint: Option<String>) -> Self {
        Self {
            api_key: ArcSwapOption::from_pointee(transport::lookup_credential("openai")),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            http: http.chat.clone(),
        }
    }

    fn request_body(prompt: &str, history: &[Message], directive: &str) -> Value {
        json!({
            "model": DEFAULT_OPENAI_MODEL,
            "messages": chat_messages(prompt, history, directive),
        })
    }
}

#[async_trait::async_trait]
impl ChatBackend for OpenAiBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::OpenAi
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

        let url = format!("{}/v1/chat/completions", self.endpoint);
        let body = Self::request_body(prompt, history, directive);

        let resp = match self
            .http
            .post(&url)
            .bearer_auth(key.as_str())
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
                v.pointer("/choices/0/message/content")
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
