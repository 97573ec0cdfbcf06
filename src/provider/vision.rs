//! Vision / embedding provider.
//!
//! Supports three operations, each mapped to `POST {base_url}/v1/{operation}`:
//! - `embed`: vector embeddings for text or images
//! - `describe`: caption or describe an image
//! - `parse`: document layout parsing

use super::http::post_json;
use super::{respond, Provider, ProviderError, ProviderKind};
use crate::envelope::{DispatchRequest, DispatchResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Operation requested through `payload.operation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionOperation {
    Embed,
    Describe,
    Parse,
}

impl VisionOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisionOperation::Embed => "embed",
            VisionOperation::Describe => "describe",
            VisionOperation::Parse => "parse",
        }
    }
}

impl FromStr for VisionOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "embed" => Ok(VisionOperation::Embed),
            "describe" => Ok(VisionOperation::Describe),
            "parse" => Ok(VisionOperation::Parse),
            _ => Err(format!(
                "unsupported operation '{}' (expected embed, describe or parse)",
                s
            )),
        }
    }
}

pub struct VisionProvider {
    id: String,
    base_url: String,
    timeout: Duration,
    client: Arc<Client>,
}

impl VisionProvider {
    pub fn new(id: String, base_url: String, timeout: Duration, client: Arc<Client>) -> Self {
        Self {
            id,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        }
    }

    async fn execute(&self, request: &DispatchRequest) -> Result<DispatchResponse, ProviderError> {
        let operation: VisionOperation = request
            .payload_str("operation")
            .ok_or(ProviderError::MissingField("operation"))?
            .parse()
            .map_err(|message| ProviderError::InvalidField {
                field: "operation",
                message,
            })?;

        let input = request
            .payload
            .get("input")
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or(ProviderError::MissingField("input"))?;
        let options = request
            .payload
            .get("options")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));

        let url = format!("{}/v1/{}", self.base_url, operation.as_str());
        let body = json!({ "input": input, "options": options });
        let reply = post_json(&self.client, &url, &body, self.timeout, None).await?;
        let status_class = reply.status_class();

        Ok(DispatchResponse::success(&self.id, reply.body)
            .with_metadata("kind", ProviderKind::Vision.as_str())
            .with_metadata("operation", operation.as_str())
            .with_metadata("status_class", status_class))
    }
}

#[async_trait]
impl Provider for VisionProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Vision
    }

    async fn invoke(&self, request: &DispatchRequest) -> DispatchResponse {
        respond(&self.id, ProviderKind::Vision, self.execute(request).await)
    }
}
