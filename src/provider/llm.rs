//! Language-model provider.
//!
//! Speaks one of two wire dialects, chosen per profile:
//! - `openai`: POST /v1/chat/completions with optional Bearer token
//! - `ollama`: POST /api/chat with `stream: false`

use super::http::post_json;
use super::{respond, Provider, ProviderError, ProviderKind};
use crate::config::{LlmProfileConfig, WireDialect};
use crate::envelope::{DispatchRequest, DispatchResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Chat-style language-model provider bound to one configured profile.
pub struct LlmProvider {
    /// Registry id (`llm_<profile>`)
    id: String,
    base_url: String,
    model: String,
    /// Resolved API key; `None` sends no Authorization header
    api_key: Option<String>,
    timeout: Duration,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    dialect: WireDialect,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
}

impl LlmProvider {
    pub fn from_profile(
        id: String,
        profile: &LlmProfileConfig,
        api_key: Option<String>,
        client: Arc<Client>,
    ) -> Self {
        Self {
            id,
            base_url: profile.base_url.trim_end_matches('/').to_string(),
            model: profile.model.clone(),
            api_key,
            timeout: Duration::from_millis(profile.timeout_ms),
            max_tokens: profile.max_tokens,
            temperature: profile.temperature,
            dialect: profile.dialect,
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dialect(&self) -> WireDialect {
        self.dialect
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// System prompt (optional) followed by the user text.
    fn build_messages(request: &DispatchRequest) -> Result<Vec<ChatMessage>, ProviderError> {
        let user_text = request
            .message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| request.payload_str("prompt"))
            .ok_or(ProviderError::MissingField("message"))?;

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.payload_str("system") {
            messages.push(ChatMessage {
                role: "system",
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user_text.to_string(),
        });
        Ok(messages)
    }

    async fn complete(&self, request: &DispatchRequest) -> Result<DispatchResponse, ProviderError> {
        let messages = Self::build_messages(request)?;

        let (content, model, usage, status_class) = match self.dialect {
            WireDialect::OpenAI => {
                let url = format!("{}/v1/chat/completions", self.base_url);
                let body = OpenAIChatRequest {
                    model: &self.model,
                    messages,
                    max_tokens: self.max_tokens,
                    temperature: self.temperature,
                };
                let reply = post_json(
                    &self.client,
                    &url,
                    &body,
                    self.timeout,
                    self.api_key.as_deref(),
                )
                .await?;
                let status_class = reply.status_class();
                let parsed: OpenAIChatResponse =
                    serde_json::from_value(reply.body).map_err(|e| {
                        ProviderError::InvalidResponse(format!(
                            "Failed to parse completion response: {}",
                            e
                        ))
                    })?;
                let content = parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .ok_or_else(|| {
                        ProviderError::InvalidResponse("completion has no choices".to_string())
                    })?;
                (content, parsed.model, parsed.usage, status_class)
            }
            WireDialect::Ollama => {
                let url = format!("{}/api/chat", self.base_url);
                let body = OllamaChatRequest {
                    model: &self.model,
                    messages,
                    stream: false,
                    options: OllamaOptions {
                        temperature: self.temperature,
                        num_predict: self.max_tokens,
                    },
                };
                let reply = post_json(&self.client, &url, &body, self.timeout, None).await?;
                let status_class = reply.status_class();
                let parsed: OllamaChatResponse =
                    serde_json::from_value(reply.body).map_err(|e| {
                        ProviderError::InvalidResponse(format!(
                            "Failed to parse Ollama chat response: {}",
                            e
                        ))
                    })?;
                let usage = match (parsed.prompt_eval_count, parsed.eval_count) {
                    (Some(prompt), Some(completion)) => Some(json!({
                        "prompt_tokens": prompt,
                        "completion_tokens": completion,
                        "total_tokens": prompt.saturating_add(completion),
                    })),
                    _ => None,
                };
                (parsed.message.content, parsed.model, usage, status_class)
            }
        };

        let model = model.unwrap_or_else(|| self.model.clone());
        let mut data = json!({ "content": content, "model": model });
        if let Some(usage) = usage {
            data["usage"] = usage;
        }

        Ok(DispatchResponse::success(&self.id, data)
            .with_metadata("kind", ProviderKind::Llm.as_str())
            .with_metadata("model", model)
            .with_metadata("dialect", self.dialect.as_str())
            .with_metadata("status_class", status_class))
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<Value>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAIChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: Option<String>,
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

#[async_trait]
impl Provider for LlmProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Llm
    }

    async fn invoke(&self, request: &DispatchRequest) -> DispatchResponse {
        tracing::debug!(
            provider_id = %self.id,
            model = %self.model,
            dialect = self.dialect.as_str(),
            "Calling language model"
        );
        respond(&self.id, ProviderKind::Llm, self.complete(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn test_profile(base_url: String, dialect: WireDialect) -> LlmProfileConfig {
        LlmProfileConfig {
            name: "test".to_string(),
            base_url,
            model: "test-model".to_string(),
            api_key_env: None,
            timeout_ms: 5_000,
            max_tokens: Some(256),
            temperature: Some(0.1),
            dialect,
        }
    }

    fn test_provider(base_url: String, dialect: WireDialect, api_key: Option<&str>) -> LlmProvider {
        LlmProvider::from_profile(
            "llm_test".to_string(),
            &test_profile(base_url, dialect),
            api_key.map(str::to_string),
            Arc::new(Client::new()),
        )
    }

    #[tokio::test]
    async fn test_openai_completion_with_bearer_auth() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test123")
            .match_body(Matcher::PartialJson(json!({
                "model": "test-model",
                "max_tokens": 256,
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "Hello"}
                ]
            })))
            .with_status(200)
            .with_body(r#"{"id":"cmpl-1","model":"test-model-0613","choices":[{"index":0,"message":{"role":"assistant","content":"Hi"}}],"usage":{"prompt_tokens":3,"completion_tokens":1,"total_tokens":4}}"#)
            .create_async()
            .await;

        let provider = test_provider(server.url(), WireDialect::OpenAI, Some("sk-test123"));
        let request = DispatchRequest::new("chat", "bot")
            .with_message("Hello")
            .with_payload("system", "be brief");

        let response = provider.invoke(&request).await;

        mock.assert_async().await;
        assert!(response.ok());
        assert_eq!(response.provider_id(), "llm_test");
        let data = response.data().unwrap();
        assert_eq!(data["content"], "Hi");
        assert_eq!(data["usage"]["total_tokens"], 4);
        assert_eq!(response.metadata()["kind"], "llm");
        assert_eq!(response.metadata()["model"], "test-model-0613");
        assert_eq!(response.metadata()["dialect"], "openai");
        assert_eq!(response.metadata()["status_class"], "2xx");
    }

    #[tokio::test]
    async fn test_openai_without_key_sends_no_auth_header() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", Matcher::Missing)
            .with_status(401)
            .with_body("missing api key")
            .create_async()
            .await;

        let provider = test_provider(server.url(), WireDialect::OpenAI, None);
        let request = DispatchRequest::new("chat", "bot").with_message("Hello");

        let response = provider.invoke(&request).await;

        mock.assert_async().await;
        assert!(!response.ok());
        assert_eq!(response.error(), Some("Backend error 401: missing api key"));
        assert_eq!(response.metadata()["error_kind"], "upstream");
    }

    #[tokio::test]
    async fn test_ollama_completion() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({
                "model": "test-model",
                "stream": false,
                "options": {"num_predict": 256}
            })))
            .with_status(200)
            .with_body(r#"{"model":"test-model","message":{"role":"assistant","content":"local hi"},"done":true,"prompt_eval_count":5,"eval_count":2}"#)
            .create_async()
            .await;

        let provider = test_provider(server.url(), WireDialect::Ollama, None);
        let request = DispatchRequest::new("chat", "bot").with_payload("prompt", "Hello");

        let response = provider.invoke(&request).await;

        mock.assert_async().await;
        assert!(response.ok());
        assert_eq!(response.data().unwrap()["content"], "local hi");
        assert_eq!(response.data().unwrap()["usage"]["total_tokens"], 7);
        assert_eq!(response.metadata()["dialect"], "ollama");
    }

    #[tokio::test]
    async fn test_ollama_large_token_counts_do_not_overflow() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(
                r#"{"message":{"role":"assistant","content":"x"},"prompt_eval_count":4294967295,"eval_count":4294967295}"#,
            )
            .create_async()
            .await;

        let provider = test_provider(server.url(), WireDialect::Ollama, None);
        let request = DispatchRequest::new("chat", "bot").with_message("Hello");

        let response = provider.invoke(&request).await;

        assert!(response.ok());
        assert_eq!(
            response.data().unwrap()["usage"]["total_tokens"],
            8_589_934_590u64
        );
    }

    #[tokio::test]
    async fn test_missing_message_is_rejected_without_call() {
        let provider = test_provider("http://127.0.0.1:1".to_string(), WireDialect::OpenAI, None);
        let response = provider.invoke(&DispatchRequest::new("chat", "bot")).await;

        assert!(!response.ok());
        assert_eq!(response.error(), Some("missing required field 'message'"));
        assert_eq!(response.metadata()["error_kind"], "missing_field");
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid_response() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let provider = test_provider(server.url(), WireDialect::OpenAI, None);
        let response = provider
            .invoke(&DispatchRequest::new("chat", "bot").with_message("Hello"))
            .await;

        assert!(!response.ok());
        assert_eq!(response.metadata()["error_kind"], "invalid_response");
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let provider = test_provider("http://127.0.0.1:1".to_string(), WireDialect::Ollama, None);
        let response = provider
            .invoke(&DispatchRequest::new("chat", "bot").with_message("Hello"))
            .await;

        assert!(!response.ok());
        assert_eq!(response.provider_id(), "llm_test");
    }

    #[test]
    fn test_profile_translation() {
        let provider = test_provider("http://localhost:11434/".to_string(), WireDialect::Ollama, None);

        assert_eq!(provider.timeout(), Duration::from_millis(5_000));
        assert_eq!(provider.model(), "test-model");
        assert_eq!(provider.dialect(), WireDialect::Ollama);
        assert!(!provider.has_api_key());
        assert_eq!(provider.base_url, "http://localhost:11434");
    }
}
