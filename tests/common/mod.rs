//! Shared test utilities for Conduit integration tests.
//!
//! Provides stub providers, rule builders and registry helpers so each test
//! file can assemble a routing table in a few lines.

#![allow(dead_code)]

use async_trait::async_trait;
use conduit::config::{RuleConfig, WhenConfig};
use conduit::envelope::{DispatchRequest, DispatchResponse};
use conduit::provider::{Provider, ProviderKind};
use conduit::registry::ProviderRegistry;
use conduit::routing::RoutingTable;
use conduit::secrets::{SecretLookup, StaticSecrets};
use serde_json::Value;
use std::sync::Arc;

// =============================================================================
// Stub Providers
// =============================================================================

/// Provider that answers with its own id and the payload it received.
pub struct EchoProvider {
    id: String,
    kind: ProviderKind,
}

impl EchoProvider {
    pub fn new(id: &str, kind: ProviderKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
        }
    }
}

#[async_trait]
impl Provider for EchoProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn invoke(&self, request: &DispatchRequest) -> DispatchResponse {
        DispatchResponse::success(&self.id, Value::Object(request.payload.clone()))
            .with_metadata("kind", self.kind.as_str())
    }
}

/// Provider that panics on every call.
pub struct PanickingProvider(pub String);

#[async_trait]
impl Provider for PanickingProvider {
    fn id(&self) -> &str {
        &self.0
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Workflow
    }

    async fn invoke(&self, _request: &DispatchRequest) -> DispatchResponse {
        panic!("provider {} failed hard", self.0);
    }
}

// =============================================================================
// Registry Builders
// =============================================================================

/// Registry of echo providers with the given ids.
pub fn echo_registry(ids: &[&str]) -> Arc<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();
    for id in ids {
        registry.register(Arc::new(EchoProvider::new(id, ProviderKind::Llm)));
    }
    Arc::new(registry)
}

// =============================================================================
// Rule Builders
// =============================================================================

pub fn provider_rule(id: &str, priority: i64, when: WhenConfig, provider: &str) -> RuleConfig {
    RuleConfig {
        id: id.to_string(),
        priority,
        when,
        use_provider: Some(provider.to_string()),
        ..RuleConfig::default()
    }
}

pub fn when_agent(agent: &str) -> WhenConfig {
    WhenConfig {
        agent: Some(agent.to_string()),
        ..WhenConfig::default()
    }
}

pub fn when_mode(mode: &str) -> WhenConfig {
    WhenConfig {
        mode: Some(mode.to_string()),
        ..WhenConfig::default()
    }
}

pub fn when_default() -> WhenConfig {
    WhenConfig {
        default: true,
        ..WhenConfig::default()
    }
}

/// Routing table over `rules` with no secrets available.
pub fn table(rules: &[RuleConfig], registry: Arc<ProviderRegistry>) -> RoutingTable {
    table_with_secrets(rules, registry, Arc::new(StaticSecrets::new()))
}

pub fn table_with_secrets(
    rules: &[RuleConfig],
    registry: Arc<ProviderRegistry>,
    secrets: Arc<dyn SecretLookup>,
) -> RoutingTable {
    RoutingTable::from_config(rules, registry, secrets)
}
