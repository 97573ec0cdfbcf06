//! Response bodies of the listing and health endpoints.
//!
//! The dispatch endpoint speaks [`crate::envelope`] types directly.

use crate::provider::ProviderKind;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    /// Registered providers
    pub providers: usize,
    /// Loaded routing rules
    pub rules: usize,
}

/// One registered provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub id: String,
    pub kind: ProviderKind,
}

/// Provider list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderEntry>,
}
