//! Lookup configuration.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_LOOKUP_BASE_URL: &str = "http://127.0.0.1:8900";
pub const DEFAULT_DEBOUNCE_MS: u64 = 800;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Configuration for the pincode lookup subsystem.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Base URL of the lookup service.
    pub base_url: String,
    /// Quiet window after the last edit before a lookup is issued.
    pub debounce_ms: u64,
    /// Per-request timeout for the lookup call.
    pub request_timeout_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOOKUP_BASE_URL.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl LookupConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
