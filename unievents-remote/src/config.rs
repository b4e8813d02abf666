//! Remote event service configuration.

use crate::error::{RemoteError, RemoteResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for reaching the event service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the events API (e.g., "https://events.example.edu").
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Artificial delay applied by the in-memory service, in milliseconds.
    pub simulated_latency_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
            simulated_latency_ms: 0,
        }
    }
}

impl RemoteConfig {
    pub fn validate(&self) -> RemoteResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(RemoteError::Config("base_url must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(RemoteError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}
