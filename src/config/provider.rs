//! Provider configuration: language-model profiles, agents, integrations and
//! the developer-tooling backend.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default developer-tooling backend address
pub const DEFAULT_DEVTOOLS_URL: &str = "http://127.0.0.1:8765";

/// Wire protocol spoken by a language-model backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WireDialect {
    /// OpenAI-compatible `/v1/chat/completions`
    #[default]
    OpenAI,
    /// Ollama native `/api/chat`
    Ollama,
}

impl WireDialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireDialect::OpenAI => "openai",
            WireDialect::Ollama => "ollama",
        }
    }
}

impl FromStr for WireDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(WireDialect::OpenAI),
            "ollama" => Ok(WireDialect::Ollama),
            _ => Err(format!("Invalid wire dialect: {}", s)),
        }
    }
}

/// One language-model profile (`[[llm_profiles]]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProfileConfig {
    pub name: String,
    pub base_url: String,
    pub model: String,
    /// Secret key name holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub dialect: WireDialect,
}

fn default_llm_timeout_ms() -> u64 {
    60_000
}

/// A logical agent (`[agents.<name>]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub description: Option<String>,
    /// Developer tools the agent may call; non-empty lists get a devtools provider
    pub tools: Vec<String>,
}

/// An orchestrator-style integration (`[integrations.<name>]`).
///
/// `type` stays a plain string so unknown kinds can be skipped at registry
/// build time instead of failing the whole config parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationConfig {
    #[serde(rename = "type")]
    pub integration_type: String,
    pub base_url: String,
    #[serde(default = "default_integration_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_integration_timeout_ms() -> u64 {
    120_000
}

/// Developer-tooling backend (`[devtools]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevToolsConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for DevToolsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DEVTOOLS_URL.to_string(),
            timeout_ms: 30_000,
        }
    }
}
