//! Core type definitions: backend identifiers, dispatch mode and the response envelope.

pub mod message;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BackendError, GatewayError};

/// Closed set of completion backends, in dispatch priority order.
///
/// Exactly one adapter instance exists per kind, owned by the gateway for its
/// lifetime. `Offline` is the terminal fallback and is never ranked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Gemini,
    OpenAi,
    Anthropic,
    Ollama,
    Offline,
}

impl BackendKind {
    /// All kinds in dispatch priority order. `Offline` is always last.
    pub const ALL: [BackendKind; 5] = [
        BackendKind::Gemini,
        BackendKind::OpenAi,
        BackendKind::Anthropic,
        BackendKind::Ollama,
        BackendKind::Offline,
    ];

    /// Stable lowercase name used on the string-keyed external interface.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Gemini => "gemini",
            BackendKind::OpenAi => "openai",
            BackendKind::Anthropic => "anthropic",
            BackendKind::Ollama => "ollama",
            BackendKind::Offline => "offline",
        }
    }

    /// Whether this backend talks to the network at all.
    pub fn is_networked(&self) -> bool {
        !matches!(self, BackendKind::Offline)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(BackendKind::Gemini),
            "openai" => Ok(BackendKind::OpenAi),
            "anthropic" => Ok(BackendKind::Anthropic),
            "ollama" => Ok(BackendKind::Ollama),
            "offline" | "local" => Ok(BackendKind::Offline),
            other => Err(GatewayError::UnknownBackend(other.to_string())),
        }
    }
}

/// Dispatch mode governing whether cross-backend fallback occurs.
///
/// `Automatic` walks the ranked backends and falls through on failure;
/// `Pinned` sends every request to one backend and surfaces its failures
/// verbatim. There is no implicit transition back to `Automatic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Automatic,
    Pinned(BackendKind),
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Automatic => f.write_str("automatic"),
            DispatchMode::Pinned(kind) => write!(f, "pinned:{kind}"),
        }
    }
}

/// Standardized result of a single chat dispatch.
///
/// `origin` always names the adapter that actually produced (or attempted to
/// produce) `content`, regardless of how many backends were tried before it.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub success: bool,
    pub content: String,
    pub origin: BackendKind,
    pub error: Option<BackendError>,
}

impl ResponseEnvelope {
    pub fn success(origin: BackendKind, content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            origin,
            error: None,
        }
    }

    pub fn failure(origin: BackendKind, error: BackendError) -> Self {
        Self {
            success: false,
            content: String::new(),
            origin,
            error: Some(error),
        }
    }
}
