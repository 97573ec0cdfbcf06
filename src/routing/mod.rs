//! Rule-based request routing
//!
//! The routing table holds the priority-ordered rule set and resolves each
//! request to one registered provider. Rules are sorted once at construction
//! and never change afterwards, so resolution is a pure function of the
//! request and the secret lookup.

use std::sync::Arc;

pub mod error;
pub mod rule;

pub use error::RoutingError;
pub use rule::{
    resolve_llm_alias, Clause, Condition, LlmTarget, Predicate, RoutingRule, RuleTarget,
    LLM_FROM_METADATA,
};

use crate::config::RuleConfig;
use crate::envelope::DispatchRequest;
use crate::provider::llm_provider_id;
use crate::registry::{ProviderDescriptor, ProviderRegistry};
use crate::secrets::SecretLookup;
use rule::PROVIDER_FIELD;

/// Outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Id of the winning rule
    pub rule_id: String,
    /// True when the rule won in the default-fallback pass
    pub used_default: bool,
    pub descriptor: ProviderDescriptor,
}

impl Resolution {
    pub fn provider_id(&self) -> &str {
        &self.descriptor.id
    }
}

/// Routing table shared read-only across requests
pub struct RoutingTable {
    /// Rules sorted by ascending priority, ties in source order
    rules: Vec<RoutingRule>,

    /// Providers that resolved ids are checked against
    registry: Arc<ProviderRegistry>,

    /// Oracle for `api_key_available` conditions
    secrets: Arc<dyn SecretLookup>,
}

impl RoutingTable {
    /// Create a table from compiled rules. The sort is stable.
    pub fn new(
        mut rules: Vec<RoutingRule>,
        registry: Arc<ProviderRegistry>,
        secrets: Arc<dyn SecretLookup>,
    ) -> Self {
        rules.sort_by_key(|rule| rule.priority);
        Self {
            rules,
            registry,
            secrets,
        }
    }

    /// Compile configured rules and build the table.
    pub fn from_config(
        rules: &[RuleConfig],
        registry: Arc<ProviderRegistry>,
        secrets: Arc<dyn SecretLookup>,
    ) -> Self {
        let compiled = rules.iter().cloned().map(RoutingRule::from).collect();
        let table = Self::new(compiled, registry, secrets);
        table.warn_on_unregistered_targets();
        table
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Resolve a request to a registered provider.
    ///
    /// Non-default rules are tried first in priority order; when none holds,
    /// the first default rule wins regardless of its clauses.
    pub fn resolve(&self, request: &DispatchRequest) -> Result<Resolution, RoutingError> {
        let (rule, used_default) = self.select_rule(request)?;
        let provider_id = resolve_target(rule, request)?;

        tracing::debug!(
            rule_id = %rule.id,
            provider_id = %provider_id,
            used_default,
            "Routing rule selected"
        );

        let descriptor =
            self.registry
                .get(&provider_id)
                .cloned()
                .ok_or_else(|| RoutingError::UnknownProvider {
                    provider_id: provider_id.clone(),
                    known: self.registry.ids(),
                })?;

        Ok(Resolution {
            rule_id: rule.id.clone(),
            used_default,
            descriptor,
        })
    }

    fn select_rule(&self, request: &DispatchRequest) -> Result<(&RoutingRule, bool), RoutingError> {
        let secrets = self.secrets.as_ref();
        if let Some(rule) = self
            .rules
            .iter()
            .filter(|rule| !rule.is_default())
            .find(|rule| rule.predicate.matches(request, secrets))
        {
            return Ok((rule, false));
        }

        self.rules
            .iter()
            .find(|rule| rule.is_default())
            .map(|rule| (rule, true))
            .ok_or(RoutingError::NoMatchingRule)
    }

    fn warn_on_unregistered_targets(&self) {
        for rule in &self.rules {
            match rule.target.as_ref() {
                None => tracing::warn!(
                    rule_id = %rule.id,
                    "Routing rule has no target and will fail if it wins"
                ),
                Some(target) => {
                    if let Some(id) = target.static_provider_id() {
                        if !self.registry.contains(&id) {
                            tracing::warn!(
                                rule_id = %rule.id,
                                provider_id = %id,
                                "Routing rule targets an unregistered provider"
                            );
                        }
                    }
                }
            }
        }
    }
}

/// Turn the winning rule's target into a provider id.
fn resolve_target(rule: &RoutingRule, request: &DispatchRequest) -> Result<String, RoutingError> {
    match rule.target.as_ref() {
        Some(RuleTarget::Provider(id)) => Ok(id.clone()),
        Some(RuleTarget::Metadata(key)) => request
            .payload_str(key)
            .map(str::to_string)
            .ok_or_else(|| RoutingError::MissingMetadataProvider {
                rule_id: rule.id.clone(),
                key: key.clone(),
            }),
        Some(RuleTarget::Llm(LlmTarget::FromMetadata)) => request
            .payload_str(PROVIDER_FIELD)
            .map(|name| resolve_llm_alias(name).to_string())
            .ok_or_else(|| RoutingError::MissingProviderInMetadata {
                rule_id: rule.id.clone(),
            }),
        Some(RuleTarget::Llm(LlmTarget::Profile(profile))) => Ok(llm_provider_id(profile)),
        None => Err(RoutingError::InvalidRule {
            rule_id: rule.id.clone(),
        }),
    }
}
