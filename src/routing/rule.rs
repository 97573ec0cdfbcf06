//! Compiled routing rules.
//!
//! [`RuleConfig`] entries are compiled once into closed enums so every clause
//! kind is handled by an exhaustive match.

use crate::config::{ConditionConfig, RuleConfig, WhenConfig};
use crate::envelope::DispatchRequest;
use crate::provider::llm_provider_id;
use crate::secrets::SecretLookup;

/// `use_llm` value meaning "take the provider from `payload.provider`".
pub const LLM_FROM_METADATA: &str = "metadata.provider";

/// Payload field read by [`LlmTarget::FromMetadata`].
pub const PROVIDER_FIELD: &str = "provider";

/// Payload field compared by `task_type` clauses.
pub const TASK_TYPE_FIELD: &str = "task_type";

/// Symbolic provider names accepted in `payload.provider`.
const LLM_ALIASES: &[(&str, &str)] = &[("local_slm", "llm_local"), ("cloud_llm", "llm_cloud")];

/// Translate a symbolic alias to its provider id; other names pass through.
pub fn resolve_llm_alias(name: &str) -> &str {
    LLM_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, target)| *target)
        .unwrap_or(name)
}

/// One sub-condition of an `and` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    TaskType(Vec<String>),
    ApiKeyAvailable(String),
}

impl Condition {
    fn holds(&self, request: &DispatchRequest, secrets: &dyn SecretLookup) -> bool {
        match self {
            Condition::TaskType(values) => task_type_matches(values, request),
            Condition::ApiKeyAvailable(key) => secrets.contains(key),
        }
    }
}

/// One predicate clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Agent(String),
    Mode(String),
    MetadataHas(String),
    TaskType(Vec<String>),
    /// `and`: every condition must hold
    All(Vec<Condition>),
}

impl Clause {
    fn holds(&self, request: &DispatchRequest, secrets: &dyn SecretLookup) -> bool {
        match self {
            Clause::Agent(agent) => request.agent == *agent,
            Clause::Mode(mode) => request.mode == *mode,
            Clause::MetadataHas(key) => request.payload.contains_key(key),
            Clause::TaskType(values) => task_type_matches(values, request),
            Clause::All(conditions) => conditions.iter().all(|c| c.holds(request, secrets)),
        }
    }
}

fn task_type_matches(values: &[String], request: &DispatchRequest) -> bool {
    request
        .payload
        .get(TASK_TYPE_FIELD)
        .and_then(|v| v.as_str())
        .map(|task_type| values.iter().any(|v| v == task_type))
        .unwrap_or(false)
}

/// A rule's `when` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    /// Second-pass default fallback marker
    pub default: bool,
    pub clauses: Vec<Clause>,
}

impl Predicate {
    /// True when every clause holds; no clauses means unconditional.
    pub fn matches(&self, request: &DispatchRequest, secrets: &dyn SecretLookup) -> bool {
        self.clauses.iter().all(|c| c.holds(request, secrets))
    }
}

impl From<WhenConfig> for Predicate {
    fn from(when: WhenConfig) -> Self {
        let mut clauses = Vec::new();
        if let Some(agent) = when.agent {
            clauses.push(Clause::Agent(agent));
        }
        if let Some(mode) = when.mode {
            clauses.push(Clause::Mode(mode));
        }
        if let Some(key) = when.metadata_has {
            clauses.push(Clause::MetadataHas(key));
        }
        if let Some(task_type) = when.task_type {
            clauses.push(Clause::TaskType(task_type.into_vec()));
        }
        if let Some(conditions) = when.and {
            clauses.push(Clause::All(
                conditions.into_iter().flat_map(compile_condition).collect(),
            ));
        }

        Self {
            default: when.default,
            clauses,
        }
    }
}

fn compile_condition(condition: ConditionConfig) -> Vec<Condition> {
    let mut compiled = Vec::new();
    if let Some(task_type) = condition.task_type {
        compiled.push(Condition::TaskType(task_type.into_vec()));
    }
    if let Some(key) = condition.api_key_available {
        compiled.push(Condition::ApiKeyAvailable(key));
    }
    compiled
}

/// How a `use_llm` target picks its provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmTarget {
    /// Read `payload.provider`, then apply the alias table
    FromMetadata,
    /// Namespaced profile name (`llm_<profile>`)
    Profile(String),
}

impl LlmTarget {
    pub fn parse(value: &str) -> Self {
        if value == LLM_FROM_METADATA {
            LlmTarget::FromMetadata
        } else {
            LlmTarget::Profile(value.to_string())
        }
    }
}

/// Where a winning rule sends the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTarget {
    Provider(String),
    Metadata(String),
    Llm(LlmTarget),
}

impl RuleTarget {
    /// Provider id for a fixed target, `None` when it depends on the request.
    pub fn static_provider_id(&self) -> Option<String> {
        match self {
            RuleTarget::Provider(id) => Some(id.clone()),
            RuleTarget::Llm(LlmTarget::Profile(profile)) => Some(llm_provider_id(profile)),
            RuleTarget::Metadata(_) | RuleTarget::Llm(LlmTarget::FromMetadata) => None,
        }
    }
}

/// A compiled routing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRule {
    pub id: String,
    pub priority: i64,
    pub predicate: Predicate,
    /// `None` when the rule names no target; reported when the rule wins
    pub target: Option<RuleTarget>,
}

impl RoutingRule {
    pub fn is_default(&self) -> bool {
        self.predicate.default
    }
}

impl From<RuleConfig> for RoutingRule {
    fn from(config: RuleConfig) -> Self {
        let declared = [
            config.use_provider.is_some(),
            config.use_metadata.is_some(),
            config.use_llm.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();
        if declared > 1 {
            tracing::warn!(
                rule_id = %config.id,
                "Rule declares several targets; using the first of use_provider, use_metadata, use_llm"
            );
        }

        let target = match (config.use_provider, config.use_metadata, config.use_llm) {
            (Some(provider), _, _) => Some(RuleTarget::Provider(provider)),
            (None, Some(key), _) => Some(RuleTarget::Metadata(key)),
            (None, None, Some(llm)) => Some(RuleTarget::Llm(LlmTarget::parse(&llm))),
            (None, None, None) => None,
        };

        Self {
            id: config.id,
            priority: config.priority,
            predicate: config.when.into(),
            target,
        }
    }
}
