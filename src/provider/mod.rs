//! Provider capability layer.
//!
//! Every backend kind implements the [`Provider`] trait: take a request
//! envelope, return a response envelope. Transport and validation failures are
//! turned into `ok: false` envelopes inside `invoke`, so routing and dispatch
//! never branch on provider kind.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod devtools;
pub mod error;
pub(crate) mod http;
pub mod llm;
pub mod vision;
pub mod workflow;

pub use devtools::DevToolsProvider;
pub use error::ProviderError;
pub use llm::LlmProvider;
pub use vision::{VisionOperation, VisionProvider};
pub use workflow::WorkflowProvider;

use crate::envelope::{DispatchRequest, DispatchResponse};

/// Namespace prefix of language-model provider ids.
pub const LLM_PROVIDER_PREFIX: &str = "llm_";

/// Namespace prefix of developer-tooling provider ids.
pub const DEVTOOLS_PROVIDER_PREFIX: &str = "devtools_";

/// Provider id of a language-model profile, e.g. `llm_local` for `local`.
pub fn llm_provider_id(profile: &str) -> String {
    format!("{}{}", LLM_PROVIDER_PREFIX, profile)
}

/// Provider id of an agent's developer-tooling backend.
pub fn devtools_provider_id(agent: &str) -> String {
    format!("{}{}", DEVTOOLS_PROVIDER_PREFIX, agent)
}

/// Family a provider belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Language-model backend
    Llm,
    /// Developer-tool backend
    DevTools,
    /// Multi-agent orchestrator backend
    Workflow,
    /// Vision / embedding backend
    Vision,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Llm => "llm",
            ProviderKind::DevTools => "devtools",
            ProviderKind::Workflow => "workflow",
            ProviderKind::Vision => "vision",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform invoke contract implemented by every provider kind.
///
/// # Object Safety
///
/// Designed to be stored as `Arc<dyn Provider>` in the registry.
///
/// # Failure contract
///
/// `invoke` must not return early with an error or panic on bad input or
/// transport failure: those become `ok: false` responses whose
/// `provider_id` is [`Provider::id`].
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    /// Registry id (e.g. "llm_local", "devtools_coder").
    fn id(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    /// Handle one request.
    async fn invoke(&self, request: &DispatchRequest) -> DispatchResponse;
}

/// Fold a provider call outcome into the response envelope.
pub(crate) fn respond(
    provider_id: &str,
    kind: ProviderKind,
    outcome: Result<DispatchResponse, ProviderError>,
) -> DispatchResponse {
    match outcome {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                provider_id = %provider_id,
                kind = %kind,
                error_kind = e.kind(),
                error = %e,
                "Provider call failed"
            );
            DispatchResponse::failure(provider_id, e.to_string())
                .with_metadata("kind", kind.as_str())
                .with_metadata("error_kind", e.kind())
        }
    }
}
