//! JSON-over-HTTP call shared by every provider kind.

use super::ProviderError;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Successful backend reply.
#[derive(Debug)]
pub(crate) struct HttpReply {
    pub status: u16,
    pub body: Value,
}

impl HttpReply {
    /// Status code class, e.g. "2xx".
    pub fn status_class(&self) -> String {
        format!("{}xx", self.status / 100)
    }
}

/// Append `segments` to `base`, each percent-encoded as exactly one path
/// segment.
///
/// Empty, `.` and `..` segments are rejected; they cannot survive path
/// normalization as a single segment.
pub(crate) fn segment_url(base: &str, segments: &[&str]) -> Result<Url, String> {
    if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
        return Err(format!("'{}' is not a valid path segment", bad));
    }
    let mut url = Url::parse(base).map_err(|e| format!("invalid base url '{}': {}", base, e))?;
    url.path_segments_mut()
        .map_err(|_| format!("base url '{}' cannot carry a path", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// POST `body` as JSON and decode a JSON reply.
///
/// Transport failures are mapped the same way for every provider: client
/// timeouts to `Timeout`, other send failures to `Network`, non-2xx replies
/// to `Upstream` with the body text, undecodable bodies to `InvalidResponse`.
pub(crate) async fn post_json<B: Serialize + ?Sized>(
    client: &Client,
    url: impl reqwest::IntoUrl,
    body: &B,
    timeout: Duration,
    bearer: Option<&str>,
) -> Result<HttpReply, ProviderError> {
    let mut req = client.post(url).json(body).timeout(timeout);
    if let Some(key) = bearer {
        req = req.header("authorization", format!("Bearer {}", key));
    }

    let response = req.send().await.map_err(|e| {
        if e.is_timeout() {
            ProviderError::Timeout(timeout.as_millis() as u64)
        } else {
            ProviderError::Network(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ProviderError::Upstream {
            status: status.as_u16(),
            message: error_body,
        });
    }

    let body: Value = response.json().await.map_err(|e| {
        if e.is_timeout() {
            ProviderError::Timeout(timeout.as_millis() as u64)
        } else {
            ProviderError::InvalidResponse(format!("Failed to parse response body: {}", e))
        }
    })?;

    Ok(HttpReply {
        status: status.as_u16(),
        body,
    })
}
