//! Multi-agent workflow provider.
//!
//! Runs a named workflow on an orchestrator backend:
//! `POST {base_url}/v1/workflows/{workflow}/run`.

use super::http::{post_json, segment_url};
use super::{respond, Provider, ProviderError, ProviderKind};
use crate::envelope::{DispatchRequest, DispatchResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub struct WorkflowProvider {
    id: String,
    base_url: String,
    timeout: Duration,
    client: Arc<Client>,
}

impl WorkflowProvider {
    pub fn new(id: String, base_url: String, timeout: Duration, client: Arc<Client>) -> Self {
        Self {
            id,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        }
    }

    async fn run(&self, request: &DispatchRequest) -> Result<DispatchResponse, ProviderError> {
        let workflow = request
            .payload_str("workflow")
            .ok_or(ProviderError::MissingField("workflow"))?;

        if !is_workflow_name(workflow) {
            return Err(ProviderError::InvalidField {
                field: "workflow",
                message: format!(
                    "'{}' is not a valid workflow name (expected [A-Za-z0-9_-])",
                    workflow
                ),
            });
        }

        let inputs = request
            .payload
            .get("inputs")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));

        let url = segment_url(&self.base_url, &["v1", "workflows", workflow, "run"])
            .map_err(|message| ProviderError::InvalidField {
                field: "workflow",
                message,
            })?;
        let body = json!({
            "inputs": inputs,
            "message": request.message,
            "session_id": request.session_id,
            "tenant_id": request.tenant_id,
            "user_id": request.user_id,
        });
        let reply = post_json(&self.client, url, &body, self.timeout, None).await?;
        let status_class = reply.status_class();

        Ok(DispatchResponse::success(&self.id, reply.body)
            .with_metadata("kind", ProviderKind::Workflow.as_str())
            .with_metadata("workflow", workflow)
            .with_metadata("status_class", status_class))
    }
}

fn is_workflow_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[async_trait]
impl Provider for WorkflowProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Workflow
    }

    async fn invoke(&self, request: &DispatchRequest) -> DispatchResponse {
        respond(&self.id, ProviderKind::Workflow, self.run(request).await)
    }
}
