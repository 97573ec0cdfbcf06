//! Routing rule configuration
//!
//! These are the raw, as-written shapes of `[[routing.rules]]`. They are
//! compiled into [`crate::routing::RoutingRule`] when the routing table is
//! built. Keys accept both snake_case and the camelCase spelling used by
//! JSON-authored rule sets.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::error::ConfigError;

/// Routing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub rules: Vec<RuleConfig>,
}

/// One routing rule as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub id: String,
    #[serde(default = "default_rule_priority")]
    pub priority: i64,
    #[serde(default)]
    pub when: WhenConfig,
    #[serde(default, alias = "useProvider", skip_serializing_if = "Option::is_none")]
    pub use_provider: Option<String>,
    #[serde(default, alias = "useLlm", skip_serializing_if = "Option::is_none")]
    pub use_llm: Option<String>,
    #[serde(default, alias = "useMetadata", skip_serializing_if = "Option::is_none")]
    pub use_metadata: Option<String>,
}

fn default_rule_priority() -> i64 {
    100
}

/// Match predicate of a rule. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhenConfig {
    /// Marks the rule as the second-pass default fallback
    pub default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(alias = "metadataHas", skip_serializing_if = "Option::is_none")]
    pub metadata_has: Option<String>,
    #[serde(alias = "taskType", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<StringOrList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<ConditionConfig>>,
}

/// One sub-condition of an `and` clause.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionConfig {
    #[serde(alias = "taskType", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<StringOrList>,
    #[serde(alias = "apiKeyAvailable", skip_serializing_if = "Option::is_none")]
    pub api_key_available: Option<String>,
}

/// A single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StringOrList::One(value) => vec![value],
            StringOrList::Many(values) => values,
        }
    }
}

/// Reject empty or repeated rule ids.
///
/// Rules without a target are accepted here; they fail when they win a
/// resolution.
pub fn validate_rules(rules: &[RuleConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (i, rule) in rules.iter().enumerate() {
        if rule.id.is_empty() {
            return Err(ConfigError::Validation {
                field: format!("routing.rules[{}].id", i),
                message: "rule id cannot be empty".to_string(),
            });
        }
        if !seen.insert(rule.id.as_str()) {
            return Err(ConfigError::DuplicateName {
                section: "routing rule".to_string(),
                name: rule.id.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_config_snake_case() {
        let config: RoutingConfig = toml::from_str(
            r#"
            [[rules]]
            id = "docs"
            priority = 10
            use_provider = "docling"
            [rules.when]
            mode = "doc_parse"
            metadata_has = "document_url"
            "#,
        )
        .unwrap();

        let rule = &config.rules[0];
        assert_eq!(rule.id, "docs");
        assert_eq!(rule.priority, 10);
        assert_eq!(rule.use_provider.as_deref(), Some("docling"));
        assert_eq!(rule.when.mode.as_deref(), Some("doc_parse"));
        assert_eq!(rule.when.metadata_has.as_deref(), Some("document_url"));
    }

    #[test]
    fn test_rule_config_camel_case_json() {
        let rule: RuleConfig = serde_json::from_value(serde_json::json!({
            "id": "code",
            "priority": 20,
            "when": {
                "taskType": ["code", "refactor"],
                "and": [{"apiKeyAvailable": "OPENAI_API_KEY"}]
            },
            "useLlm": "cloud"
        }))
        .unwrap();

        assert_eq!(rule.use_llm.as_deref(), Some("cloud"));
        assert_eq!(
            rule.when.task_type,
            Some(StringOrList::Many(vec!["code".to_string(), "refactor".to_string()]))
        );
        let and = rule.when.and.unwrap();
        assert_eq!(and[0].api_key_available.as_deref(), Some("OPENAI_API_KEY"));
    }

    #[test]
    fn test_rule_config_defaults() {
        let rule: RuleConfig = toml::from_str(r#"id = "bare""#).unwrap();
        assert_eq!(rule.priority, 100);
        assert_eq!(rule.when, WhenConfig::default());
        assert!(rule.use_provider.is_none());
    }

    #[test]
    fn test_when_ignores_unknown_keys() {
        let when: WhenConfig = toml::from_str(r#"channel = "slack""#).unwrap();
        assert_eq!(when, WhenConfig::default());
    }

    #[test]
    fn test_string_or_list_into_vec() {
        assert_eq!(StringOrList::One("a".to_string()).into_vec(), vec!["a"]);
        assert_eq!(
            StringOrList::Many(vec!["a".to_string(), "b".to_string()]).into_vec(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn validates_duplicate_rule_ids() {
        let rules = vec![
            RuleConfig {
                id: "a".to_string(),
                ..RuleConfig::default()
            },
            RuleConfig {
                id: "a".to_string(),
                ..RuleConfig::default()
            },
        ];

        match validate_rules(&rules).unwrap_err() {
            ConfigError::DuplicateName { name, .. } => assert_eq!(name, "a"),
            other => panic!("Expected DuplicateName error, got {:?}", other),
        }
    }

    #[test]
    fn validates_empty_rule_id() {
        let rules = vec![RuleConfig::default()];
        assert!(matches!(
            validate_rules(&rules),
            Err(ConfigError::Validation { ref field, .. }) if field == "routing.rules[0].id"
        ));
    }

    #[test]
    fn validates_rule_without_target() {
        let rules = vec![RuleConfig {
            id: "no-target".to_string(),
            ..RuleConfig::default()
        }];
        assert!(validate_rules(&rules).is_ok());
    }
}
