//! Error types for routing failures

use thiserror::Error;

/// Known provider ids listed in an `UnknownProvider` message before truncation.
pub const MAX_LISTED_PROVIDERS: usize = 20;

/// Reasons a request could not be resolved to a registered provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// No rule predicate held and no default rule exists
    #[error("no routing rule matched the request and no default rule is configured")]
    NoMatchingRule,

    /// The winning rule names no target
    #[error("rule '{rule_id}' sets none of use_provider, use_llm or use_metadata")]
    InvalidRule { rule_id: String },

    /// `use_metadata` points at a payload field the request lacks
    #[error("rule '{rule_id}' takes the provider from payload field '{key}', which is missing")]
    MissingMetadataProvider { rule_id: String, key: String },

    /// `use_llm = "metadata.provider"` but the payload has no `provider`
    #[error("rule '{rule_id}' takes the model provider from payload field 'provider', which is missing")]
    MissingProviderInMetadata { rule_id: String },

    /// The resolved id is not registered
    #[error("provider '{provider_id}' is not registered; known providers: {}", list_known(.known))]
    UnknownProvider {
        provider_id: String,
        known: Vec<String>,
    },
}

impl RoutingError {
    /// Stable code reported as `metadata.error_kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            RoutingError::NoMatchingRule => "no_matching_rule",
            RoutingError::InvalidRule { .. } => "invalid_rule",
            RoutingError::MissingMetadataProvider { .. } => "missing_metadata_provider",
            RoutingError::MissingProviderInMetadata { .. } => "missing_provider_in_metadata",
            RoutingError::UnknownProvider { .. } => "unknown_provider",
        }
    }

    /// Configuration defects, as opposed to caller-side request defects.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            RoutingError::NoMatchingRule
                | RoutingError::InvalidRule { .. }
                | RoutingError::UnknownProvider { .. }
        )
    }
}

fn list_known(known: &[String]) -> String {
    if known.is_empty() {
        return "[]".to_string();
    }
    let shown: Vec<&str> = known
        .iter()
        .take(MAX_LISTED_PROVIDERS)
        .map(String::as_str)
        .collect();
    let mut listed = format!("[{}]", shown.join(", "));
    if known.len() > MAX_LISTED_PROVIDERS {
        listed.push_str(&format!(" (+{} more)", known.len() - MAX_LISTED_PROVIDERS));
    }
    listed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_lists_known_ids() {
        let err = RoutingError::UnknownProvider {
            provider_id: "llm_y".to_string(),
            known: vec!["llm_x".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "provider 'llm_y' is not registered; known providers: [llm_x]"
        );
    }

    #[test]
    fn test_unknown_provider_empty_registry() {
        let err = RoutingError::UnknownProvider {
            provider_id: "llm_y".to_string(),
            known: vec![],
        };
        assert!(err.to_string().ends_with("known providers: []"));
    }

    #[test]
    fn test_unknown_provider_truncates_long_lists() {
        let known: Vec<String> = (0..25).map(|i| format!("p{:02}", i)).collect();
        let err = RoutingError::UnknownProvider {
            provider_id: "missing".to_string(),
            known,
        };
        let message = err.to_string();

        assert!(message.contains("p19"));
        assert!(!message.contains("p20"));
        assert!(message.ends_with("(+5 more)"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(RoutingError::NoMatchingRule.kind(), "no_matching_rule");
        assert_eq!(
            RoutingError::MissingProviderInMetadata {
                rule_id: "r".to_string()
            }
            .kind(),
            "missing_provider_in_metadata"
        );
    }

    #[test]
    fn test_configuration_vs_request_errors() {
        assert!(RoutingError::InvalidRule {
            rule_id: "r".to_string()
        }
        .is_configuration_error());
        assert!(!RoutingError::MissingMetadataProvider {
            rule_id: "r".to_string(),
            key: "k".to_string()
        }
        .is_configuration_error());
    }
}
