use crate::backends::{
    AnthropicBackend, Backend, ChatBackend, GeminiBackend, OfflineBackend, OllamaBackend,
    OpenAiBackend,
};
use crate::gateway::{CallerMode, Gateway};
use crate::transport::HttpClients;
use crate::types::{BackendKind, DispatchMode};

use arc_swap::ArcSwap;

/// Builder for a [`Gateway`] with custom policy.
///
/// Keep this surface small and predictable: caller mode, the
/// configure-pins-dispatch policy, injected credentials, and per-backend
/// endpoint overrides (primarily for testing with mock servers).
pub struct GatewayBuilder {
    caller_mode: CallerMode,
    pin_on_configure: bool,
    credentials: Vec<(BackendKind, String)>,
    endpoints: Vec<(BackendKind, String)>,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self {
            caller_mode: CallerMode::default(),
            pin_on_configure: true,
            credentials: Vec::new(),
            endpoints: Vec::new(),
        }
    }

    /// Caller mode the default directive is synthesized from.
    pub fn caller_mode(mut self, mode: CallerMode) -> Self {
        self.caller_mode = mode;
        self
    }

    /// Whether a successful `configure` also pins dispatch to that backend.
    ///
    /// On by default, matching interactive use (an operator who just supplied
    /// a key wants it used next). Scripted deployments that configure several
    /// backends up front should turn it off.
    pub fn pin_on_configure(mut self, enable: bool) -> Self {
        self.pin_on_configure = enable;
        self
    }

    /// Inject a credential, overriding keyring/environment lookup.
    pub fn credential(mut self, kind: BackendKind, credential: impl Into<String>) -> Self {
        self.credentials.push((kind, credential.into()));
        self
    }

    /// Override a backend's base endpoint.
    pub fn endpoint_override(mut self, kind: BackendKind, base_url: impl Into<String>) -> Self {
        self.endpoints.push((kind, base_url.into()));
        self
    }

    pub fn build(self) -> crate::Result<Gateway> {
        let http = HttpClients::new()?;
        let endpoint = |kind: BackendKind| {
            self.endpoints
                .iter()
                .find(|(k, _)| *k == kind)
                .map(|(_, url)| url.clone())
        };

        // Construction order is dispatch priority order.
        let ranked = vec![
            Backend::Gemini(GeminiBackend::from_env(&http, endpoint(BackendKind::Gemini))),
            Backend::OpenAi(OpenAiBackend::from_env(&http, endpoint(BackendKind::OpenAi))),
            Backend::Anthropic(AnthropicBackend::from_env(
                &http,
                endpoint(BackendKind::Anthropic),
            )),
            Backend::Ollama(OllamaBackend::new(&http, endpoint(BackendKind::Ollama))),
        ];

        for (kind, credential) in &self.credentials {
            if let Some(backend) = ranked.iter().find(|b| b.kind() == *kind) {
                backend.configure(credential);
            }
        }

        Ok(Gateway {
            ranked,
            offline: OfflineBackend::new(),
            mode: ArcSwap::from_pointee(DispatchMode::Automatic),
            caller_mode: self.caller_mode,
            pin_on_configure: self.pin_on_configure,
        })
    }
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
