//! Server configuration

use serde::{Deserialize, Serialize};

/// HTTP entry point configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound applied to the shared outbound HTTP client. Providers set
    /// their own, usually shorter, per-call timeouts below this.
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8700,
            request_timeout_seconds: 300,
        }
    }
}
