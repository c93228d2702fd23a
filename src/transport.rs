//! Shared HTTP plumbing for the networked adapters: bounded-timeout clients
//! and startup credential lookup.

use std::env;
use std::time::Duration;

use keyring::Entry;

use crate::Result;

/// Upper bound on a single completion call. Exceeding it is a transport
/// failure, not a hang.
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on an availability probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Pooled HTTP clients shared by every adapter the gateway owns.
///
/// Two clients because reqwest timeouts are per-client: the probe client
/// answers `is_available` within [`PROBE_TIMEOUT`], the chat client carries
/// completion calls up to [`CHAT_TIMEOUT`].
#[derive(Debug, Clone)]
pub struct HttpClients {
    pub chat: reqwest::Client,
    pub probe: reqwest::Client,
}

impl HttpClients {
    pub fn new() -> Result<Self> {
        Ok(Self {
            chat: build_client(CHAT_TIMEOUT)?,
            probe: build_client(PROBE_TIMEOUT)?,
        })
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(8)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .build()?;
    Ok(client)
}

/// Resolve a startup credential for a backend.
///
/// Lookup order: OS keyring (service `ai-gateway`, username = backend name),
/// then the `{NAME}_API_KEY` environment variable.
pub(crate) fn lookup_credential(backend: &str) -> Option<String> {
    if let Ok(entry) = Entry::new("ai-gateway", backend) {
        if let Ok(key) = entry.get_password() {
            return Some(key);
        }
    }

    let env_var = format!("{}_API_KEY", backend.to_uppercase());
    env::var(env_var).ok()
}
