//! # ai-gateway
//!
//! 多后端 AI 聊天网关 — 在多个异构补全后端之间提供统一接口与确定性故障转移
//!
//! A multi-backend AI chat gateway: selects among heterogeneous completion
//! backends (keyed cloud services and a locally-polled daemon), exposes one
//! uniform request/response contract to callers, and provides deterministic
//! failover, manual pinning and runtime reconfiguration.
//!
//! ## Core Philosophy
//!
//! - **Closed backend set**: one adapter per [`BackendKind`], dispatched
//!   exhaustively — adding a backend is a compile-time event.
//! - **Never throws**: every dispatch path ends in a [`ResponseEnvelope`];
//!   the offline adapter is the availability floor, so a caller always gets
//!   an answer, degraded at worst.
//! - **Explicit pinning**: automatic fallback and operator pinning are
//!   distinct modes with distinct failure semantics — a pinned backend's
//!   failure is surfaced verbatim, never papered over.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_gateway::{Gateway, Message};
//!
//! #[tokio::main]
//! async fn main() -> ai_gateway::Result<()> {
//!     let gateway = Gateway::from_env()?;
//!
//!     let history = vec![Message::user("hi"), Message::assistant("hello!")];
//!     let reply = gateway.chat("Explain docker networking", &history, None).await;
//!     println!("[{}] {}", reply.origin, reply.content);
//!
//!     // Force one backend; its failures now surface verbatim.
//!     gateway.configure("anthropic", "sk-ant-...").await;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`gateway`] | Dispatcher: priority order, pinning, runtime reconfiguration |
//! | [`backends`] | One adapter per backend kind behind the uniform chat contract |
//! | [`knowledge`] | Static lookup backing the offline fallback |
//! | [`types`] | Core type definitions (kinds, envelope, messages) |
//! | [`transport`] | Bounded-timeout HTTP clients and credential lookup |

pub mod backends;
pub mod gateway;
pub mod knowledge;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use gateway::{CallerMode, Gateway, GatewayBuilder};
pub use types::{
    message::{Message, MessageRole, HISTORY_WINDOW},
    BackendKind, DispatchMode, ResponseEnvelope,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Error type for the library
pub mod error;
pub use error::{BackendError, GatewayError};
