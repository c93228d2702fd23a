//! 网关调度器 — 维护后端优先级列表、手动固定与运行时重配置
//!
//! The dispatcher. Owns one adapter per backend kind, walks them in priority
//! order (or honors a pin), and guarantees that every call path ends in a
//! [`ResponseEnvelope`] — a degraded answer at worst, never a panic.

mod builder;

pub use builder::GatewayBuilder;

use std::collections::BTreeMap;

use arc_swap::ArcSwap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backends::{Backend, ChatBackend, OfflineBackend};
use crate::error::BackendError;
use crate::types::message::Message;
use crate::types::{BackendKind, DispatchMode, ResponseEnvelope};

/// Caller mode the gateway synthesizes the default directive from. This is
/// the sole mode-coupling point; adapters are mode-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallerMode {
    Beginner,
    #[default]
    Architect,
}

impl CallerMode {
    pub fn directive(&self) -> &'static str {
        match self {
            CallerMode::Beginner => "You are a DevOps mentor for beginners.",
            CallerMode::Architect => "You are a DevOps expert architect.",
        }
    }
}

/// Multi-backend chat gateway.
///
/// The ranked list holds the networked adapters in priority order; the
/// offline adapter sits outside it as the terminal fallback, so it can never
/// be ranked first by construction. `dispatch_mode` is swapped atomically and
/// may be changed while requests are in flight.
pub struct Gateway {
    ranked: Vec<Backend>,
    offline: OfflineBackend,
    mode: ArcSwap<DispatchMode>,
    caller_mode: CallerMode,
    pin_on_configure: bool,
}

impl Gateway {
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Gateway with environment-supplied credentials and default policy.
    pub fn from_env() -> crate::Result<Self> {
        GatewayBuilder::new().build()
    }

    /// Current dispatch mode.
    pub fn mode(&self) -> DispatchMode {
        **self.mode.load()
    }

    /// Dispatch one chat request.
    ///
    /// With no explicit `directive`, one is synthesized from the caller mode.
    /// Pinned mode sends the request to the pinned backend and returns its
    /// result verbatim, failures included; automatic mode walks the ranked
    /// backends, short-circuits on the first success, and otherwise falls
    /// back to the offline adapter, annotating its answer with what was
    /// tried.
    pub async fn chat(
        &self,
        prompt: &str,
        history: &[Message],
        directive: Option<&str>,
    ) -> ResponseEnvelope {
        let directive = directive.unwrap_or_else(|| self.caller_mode.directive());
        let request_id = Uuid::new_v4();
        let mode = self.mode();
        debug!(%request_id, %mode, "dispatching chat request");

        match mode {
            DispatchMode::Pinned(kind) => {
                self.dispatch_pinned(kind, prompt, history, directive).await
            }
            DispatchMode::Automatic => self.dispatch_auto(prompt, history, directive).await,
        }
    }

    /// Convenience wrapper mirroring the caller-facing `ask` verb.
    pub async fn ask(&self, question: &str, history: &[Message]) -> ResponseEnvelope {
        self.chat(question, history, None).await
    }

    /// One-shot topic explanation with no history.
    pub async fn explain(&self, topic: &str) -> ResponseEnvelope {
        self.chat(&format!("Explain: {topic}"), &[], None).await
    }

    async fn dispatch_pinned(
        &self,
        kind: BackendKind,
        prompt: &str,
        history: &[Message],
        directive: &str,
    ) -> ResponseEnvelope {
        let Some(backend) = self.backend(kind) else {
            return self.offline.chat(prompt, history, directive).await;
        };

        if !backend.is_available().await {
            warn!(backend = %kind, "pinned backend unavailable, no fallback by design");
            return ResponseEnvelope::failure(kind, BackendError::PinnedUnavailable(kind));
        }

        // Pinned calls are never retried elsewhere: the operator asked for
        // this backend and learns immediately when it is broken.
        backend.chat(prompt, history, directive).await
    }

    async fn dispatch_auto(
        &self,
        prompt: &str,
        history: &[Message],
        directive: &str,
    ) -> ResponseEnvelope {
        let mut failures: Vec<(BackendKind, BackendError)> = Vec::new();

        for backend in &self.ranked {
            if !backend.is_available().await {
                continue;
            }
            let envelope = backend.chat(prompt, history, directive).await;
            if envelope.success {
                return envelope;
            }
            let error = envelope
                .error
                .unwrap_or_else(|| BackendError::Transport("unspecified failure".into()));
            warn!(backend = %envelope.origin, %error, "backend attempt failed, falling through");
            failures.push((envelope.origin, error));
        }

        let fallback = self.offline.chat(prompt, history, directive).await;
        if failures.is_empty() {
            return fallback;
        }

        let tried = failures
            .iter()
            .map(|(kind, error)| format!("- {kind}: {error}"))
            .collect::<Vec<_>>()
            .join("\n");
        ResponseEnvelope::success(
            BackendKind::Offline,
            format!(
                "(local fallback) {}\n\nNote: remote backends failed:\n{tried}",
                fallback.content
            ),
        )
    }

    /// Probe every adapter. Never panics; idempotent between mutations.
    pub async fn status(&self) -> BTreeMap<String, bool> {
        let mut map = BTreeMap::new();
        for backend in &self.ranked {
            map.insert(backend.kind().to_string(), backend.is_available().await);
        }
        map.insert(
            self.offline.kind().to_string(),
            self.offline.is_available().await,
        );
        map
    }

    /// Whether any networked backend can currently serve a request.
    pub async fn is_online(&self) -> bool {
        for backend in &self.ranked {
            if backend.is_available().await {
                return true;
            }
        }
        false
    }

    /// Pin dispatch to one backend by name. Fails (and leaves the mode
    /// unchanged) when the name is unknown or the backend is unavailable.
    pub async fn switch(&self, name: &str) -> bool {
        match name.parse() {
            Ok(kind) => self.switch_kind(kind).await,
            Err(_) => {
                warn!(%name, "switch rejected: unknown backend name");
                false
            }
        }
    }

    pub async fn switch_kind(&self, kind: BackendKind) -> bool {
        if !self.probe(kind).await {
            return false;
        }
        self.mode.store(DispatchMode::Pinned(kind).into());
        info!(backend = %kind, "dispatch pinned");
        true
    }

    /// Apply a credential to one backend by name. Returns whether the
    /// backend reports available afterwards; on success the gateway also
    /// pins to it when the `pin_on_configure` policy is enabled.
    pub async fn configure(&self, name: &str, credential: &str) -> bool {
        match name.parse() {
            Ok(kind) => self.configure_kind(kind, credential).await,
            Err(_) => {
                warn!(%name, "configure rejected: unknown backend name");
                false
            }
        }
    }

    pub async fn configure_kind(&self, kind: BackendKind, credential: &str) -> bool {
        match self.backend(kind) {
            Some(backend) => backend.configure(credential),
            None => self.offline.configure(credential),
        }

        if !self.probe(kind).await {
            return false;
        }
        if self.pin_on_configure {
            self.mode.store(DispatchMode::Pinned(kind).into());
            info!(backend = %kind, "configured and pinned");
        } else {
            info!(backend = %kind, "configured");
        }
        true
    }

    fn backend(&self, kind: BackendKind) -> Option<&Backend> {
        self.ranked.iter().find(|b| b.kind() == kind)
    }

    async fn probe(&self, kind: BackendKind) -> bool {
        match self.backend(kind) {
            Some(backend) => backend.is_available().await,
            None => kind == BackendKind::Offline && self.offline.is_available().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_mode_directives_differ() {
        assert_ne!(
            CallerMode::Beginner.directive(),
            CallerMode::Architect.directive()
        );
    }

    #[tokio::test]
    async fn test_switch_to_offline_always_succeeds() {
        let gateway = Gateway::builder().build().unwrap();
        assert!(gateway.switch("offline").await);
        assert_eq!(gateway.mode(), DispatchMode::Pinned(BackendKind::Offline));
    }

    #[tokio::test]
    async fn test_switch_unknown_name_leaves_mode_unchanged() {
        let gateway = Gateway::builder().build().unwrap();
        assert!(!gateway.switch("grok").await);
        assert_eq!(gateway.mode(), DispatchMode::Automatic);
    }

    #[tokio::test]
    async fn test_pinned_offline_serves_chat() {
        let gateway = Gateway::builder().build().unwrap();
        gateway.switch("offline").await;
        let env = gateway.chat("explain docker", &[], None).await;
        assert!(env.success);
        assert_eq!(env.origin, BackendKind::Offline);
    }
}
