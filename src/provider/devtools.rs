//! Developer-tooling provider.
//!
//! One instance per agent that declares tools. Calls are forwarded to the
//! shared tooling backend at `POST /v1/tools/call`.

use super::http::post_json;
use super::{respond, Provider, ProviderError, ProviderKind};
use crate::envelope::{DispatchRequest, DispatchResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub struct DevToolsProvider {
    id: String,
    /// Agent whose tool list gates calls
    agent: String,
    tools: Vec<String>,
    base_url: String,
    timeout: Duration,
    client: Arc<Client>,
}

impl DevToolsProvider {
    pub fn new(
        id: String,
        agent: String,
        tools: Vec<String>,
        base_url: String,
        timeout: Duration,
        client: Arc<Client>,
    ) -> Self {
        Self {
            id,
            agent,
            tools,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        }
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    async fn call_tool(&self, request: &DispatchRequest) -> Result<DispatchResponse, ProviderError> {
        let tool = request
            .payload_str("tool")
            .ok_or(ProviderError::MissingField("tool"))?;

        if !self.tools.iter().any(|t| t == tool) {
            return Err(ProviderError::InvalidField {
                field: "tool",
                message: format!("tool '{}' is not enabled for agent '{}'", tool, self.agent),
            });
        }

        let arguments = request
            .payload
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));

        let url = format!("{}/v1/tools/call", self.base_url);
        let body = json!({
            "agent": self.agent,
            "tool": tool,
            "arguments": arguments,
        });
        let reply = post_json(&self.client, &url, &body, self.timeout, None).await?;
        let status_class = reply.status_class();

        Ok(DispatchResponse::success(&self.id, reply.body)
            .with_metadata("kind", ProviderKind::DevTools.as_str())
            .with_metadata("tool", tool)
            .with_metadata("status_class", status_class))
    }
}

#[async_trait]
impl Provider for DevToolsProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::DevTools
    }

    async fn invoke(&self, request: &DispatchRequest) -> DispatchResponse {
        respond(&self.id, ProviderKind::DevTools, self.call_tool(request).await)
    }
}
