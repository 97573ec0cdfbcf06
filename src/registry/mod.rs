//! Provider Registry module.
//!
//! Builds the id → provider map once from configuration. After construction
//! the registry is shared behind an `Arc` and only read, so request handling
//! needs no locking.


use crate::config::ConduitConfig;
use crate::provider::{
    devtools_provider_id, llm_provider_id, DevToolsProvider, LlmProvider, Provider, ProviderKind,
    VisionProvider, WorkflowProvider,
};
use crate::secrets::SecretLookup;
use reqwest::Client;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Integration `type` that yields a multi-agent workflow provider.
pub const INTEGRATION_MULTI_AGENT: &str = "multi_agent";

/// Integration `type` that yields a vision/embedding provider.
pub const INTEGRATION_VISION: &str = "vision";

/// Runtime registration record.
#[derive(Clone)]
pub struct ProviderDescriptor {
    pub id: String,
    pub kind: ProviderKind,
    pub provider: Arc<dyn Provider>,
}

impl ProviderDescriptor {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            id: provider.id().to_string(),
            kind: provider.kind(),
            provider,
        }
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// The Provider Registry maps provider ids to capabilities.
///
/// # Examples
///
/// ```
/// use conduit::config::ConduitConfig;
/// use conduit::registry::ProviderRegistry;
/// use conduit::secrets::StaticSecrets;
/// use reqwest::Client;
/// use std::sync::Arc;
///
/// let config: ConduitConfig = toml::from_str(r#"
/// [[llm_profiles]]
/// name = "local"
/// base_url = "http://localhost:11434"
/// model = "llama3.2"
/// dialect = "ollama"
/// "#).unwrap();
///
/// let registry = ProviderRegistry::from_config(&config, &StaticSecrets::new(), Arc::new(Client::new()));
/// assert!(registry.contains("llm_local"));
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, ProviderDescriptor>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every provider described by the configuration.
    ///
    /// No connections are opened here. A missing API key is logged and the
    /// provider is still registered; unknown integration types are skipped.
    pub fn from_config(
        config: &ConduitConfig,
        secrets: &dyn SecretLookup,
        client: Arc<Client>,
    ) -> Self {
        let mut registry = Self::new();

        for profile in &config.llm_profiles {
            let id = llm_provider_id(&profile.name);
            let api_key = match profile.api_key_env.as_deref() {
                Some(key_name) => {
                    let key = secrets.get(key_name);
                    if key.is_none() {
                        tracing::warn!(
                            provider_id = %id,
                            secret = %key_name,
                            "API key not available; provider registered but calls will be unauthenticated"
                        );
                    }
                    key
                }
                None => None,
            };

            registry.register(Arc::new(LlmProvider::from_profile(
                id.clone(),
                profile,
                api_key,
                Arc::clone(&client),
            )));
            tracing::info!(
                provider_id = %id,
                model = %profile.model,
                dialect = profile.dialect.as_str(),
                timeout_ms = profile.timeout_ms,
                "Registered language-model provider"
            );
        }

        for (agent, agent_config) in &config.agents {
            if agent_config.tools.is_empty() {
                continue;
            }
            let id = devtools_provider_id(agent);
            registry.register(Arc::new(DevToolsProvider::new(
                id.clone(),
                agent.clone(),
                agent_config.tools.clone(),
                config.devtools.base_url.clone(),
                Duration::from_millis(config.devtools.timeout_ms),
                Arc::clone(&client),
            )));
            tracing::info!(
                provider_id = %id,
                tools = agent_config.tools.len(),
                "Registered developer-tooling provider"
            );
        }

        for (name, integration) in &config.integrations {
            let timeout = Duration::from_millis(integration.timeout_ms);
            let provider: Arc<dyn Provider> = match integration.integration_type.as_str() {
                INTEGRATION_MULTI_AGENT => Arc::new(WorkflowProvider::new(
                    name.clone(),
                    integration.base_url.clone(),
                    timeout,
                    Arc::clone(&client),
                )),
                INTEGRATION_VISION => Arc::new(VisionProvider::new(
                    name.clone(),
                    integration.base_url.clone(),
                    timeout,
                    Arc::clone(&client),
                )),
                other => {
                    tracing::warn!(
                        integration = %name,
                        integration_type = %other,
                        "Unknown integration type, skipping"
                    );
                    continue;
                }
            };
            tracing::info!(
                provider_id = %name,
                kind = %provider.kind(),
                base_url = %integration.base_url,
                "Registered integration provider"
            );
            registry.register(provider);
        }

        registry
    }

    /// Add a provider while building. Last writer wins on id collision.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        let descriptor = ProviderDescriptor::new(provider);
        if let Some(previous) = self.providers.insert(descriptor.id.clone(), descriptor) {
            tracing::warn!(
                provider_id = %previous.id,
                "Provider id registered twice; keeping the later definition"
            );
        }
    }

    /// Builder-style [`ProviderRegistry::register`].
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, id: &str) -> Option<&ProviderDescriptor> {
        self.providers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// All registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// All descriptors, sorted by id.
    pub fn descriptors(&self) -> Vec<&ProviderDescriptor> {
        let mut descriptors: Vec<&ProviderDescriptor> = self.providers.values().collect();
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
