//! Error types for provider calls.

use thiserror::Error;

/// Failures raised inside a provider call.
///
/// These never leave [`super::Provider::invoke`]; they are folded into an
/// `ok: false` response envelope carrying the provider's own id.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// A payload field the provider needs is absent.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A payload field is present but unusable.
    #[error("invalid field '{field}': {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Backend returned an error response (4xx, 5xx).
    #[error("Backend error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Backend response doesn't match expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Stable code reported as `metadata.error_kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::MissingField(_) => "missing_field",
            ProviderError::InvalidField { .. } => "invalid_field",
            ProviderError::Network(_) => "network",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::Upstream { .. } => "upstream",
            ProviderError::InvalidResponse(_) => "invalid_response",
            ProviderError::Configuration(_) => "configuration",
        }
    }
}
