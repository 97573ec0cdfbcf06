//! Configuration module for Conduit
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`CONDUIT_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use conduit::config::ConduitConfig;
//!
//! let toml = r#"
//! [[llm_profiles]]
//! name = "local"
//! base_url = "http://localhost:11434"
//! model = "llama3.2"
//! dialect = "ollama"
//!
//! [[routing.rules]]
//! id = "fallback"
//! use_llm = "local"
//! when = { default = true }
//! "#;
//! let config: ConduitConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.llm_profiles.len(), 1);
//! assert_eq!(config.routing.rules[0].id, "fallback");
//! ```

pub mod error;
pub mod logging;
pub mod provider;
pub mod rbac;
pub mod routing;
pub mod server;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use provider::{
    AgentConfig, DevToolsConfig, IntegrationConfig, LlmProfileConfig, WireDialect,
    DEFAULT_DEVTOOLS_URL,
};
pub use rbac::RbacConfig;
pub use routing::{ConditionConfig, RoutingConfig, RuleConfig, StringOrList, WhenConfig};
pub use server::ServerConfig;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Unified configuration consumed by the registry, routing table and server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConduitConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub devtools: DevToolsConfig,
    /// Optional access-control service used for chat context augmentation
    pub rbac: Option<RbacConfig>,
    pub llm_profiles: Vec<LlmProfileConfig>,
    pub agents: BTreeMap<String, AgentConfig>,
    pub integrations: BTreeMap<String, IntegrationConfig>,
    pub routing: RoutingConfig,
}

impl ConduitConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p).map_err(|source| ConfigError::Read {
                    path: p.to_path_buf(),
                    source,
                })?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse {
                    path: p.to_path_buf(),
                    message: e.to_string(),
                })
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are ignored and the current value is kept.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("CONDUIT_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("CONDUIT_HOST") {
            self.server.host = host;
        }
        if let Ok(level) = std::env::var("CONDUIT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CONDUIT_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }

        let mut profile_names = HashSet::new();
        for (i, profile) in self.llm_profiles.iter().enumerate() {
            for (field, value) in [
                ("name", &profile.name),
                ("base_url", &profile.base_url),
                ("model", &profile.model),
            ] {
                if value.is_empty() {
                    return Err(ConfigError::Validation {
                        field: format!("llm_profiles[{}].{}", i, field),
                        message: format!("{} cannot be empty", field),
                    });
                }
            }
            if !profile_names.insert(profile.name.as_str()) {
                return Err(ConfigError::DuplicateName {
                    section: "llm profile".to_string(),
                    name: profile.name.clone(),
                });
            }
        }

        for (name, integration) in &self.integrations {
            if integration.base_url.is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("integrations.{}.base_url", name),
                    message: "URL cannot be empty".to_string(),
                });
            }
        }

        if let Some(rbac) = &self.rbac {
            if rbac.base_url.is_empty() {
                return Err(ConfigError::Validation {
                    field: "rbac.base_url".to_string(),
                    message: "URL cannot be empty".to_string(),
                });
            }
        }

        routing::validate_rules(&self.routing.rules)?;

        Ok(())
    }
}
