use thiserror::Error;

use crate::types::BackendKind;

/// Errors surfaced while constructing or addressing the gateway itself.
///
/// Dispatch never produces these: every `chat` path ends in a
/// [`ResponseEnvelope`](crate::types::ResponseEnvelope), failures included.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to construct HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("unknown backend name: {0}")]
    UnknownBackend(String),
}

/// Classified failure of a single backend attempt.
///
/// Adapters absorb transport-level faults internally and convert them into
/// one of these variants at the adapter boundary, so the gateway's control
/// flow only ever inspects envelope data, never exception-like types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Network-level fault: refused connection, DNS failure, timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// No credential is configured; the backend is never attempted.
    #[error("no credential configured")]
    MissingCredential,

    /// HTTP 429, kept distinct so callers can suggest switching backends.
    #[error("rate limited (HTTP 429): {detail}")]
    RateLimited { detail: String },

    /// HTTP 200 whose payload did not have the expected shape.
    #[error("unexpected response structure")]
    MalformedResponse,

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// An explicitly pinned backend that cannot currently serve requests.
    #[error("backend '{0}' is pinned but unavailable; configure it or switch backends")]
    PinnedUnavailable(BackendKind),
}

impl BackendError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, BackendError::RateLimited { .. })
    }

    /// Classify a non-200 status with its response body text.
    pub(crate) fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if status == 429 {
            BackendError::RateLimited { detail }
        } else {
            BackendError::Http { status, detail }
        }
    }
}
