//! Secret lookup used for provider API keys and the `api_key_available` routing
//! condition.

use std::collections::HashMap;

/// Key → optional secret value lookup.
pub trait SecretLookup: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Reads secrets from the process environment. Empty values count as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretLookup for EnvSecrets {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

/// Fixed in-memory secrets.
#[derive(Debug, Clone, Default)]
pub struct StaticSecrets {
    values: HashMap<String, String>,
}

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl SecretLookup for StaticSecrets {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).filter(|v| !v.is_empty()).cloned()
    }
}
