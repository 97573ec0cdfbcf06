//! Request and response envelopes shared by the router, dispatcher and providers.
//!
//! Envelopes carry data only. The single piece of normalization they perform is
//! guaranteeing that `payload` and `metadata` are always present maps.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// String-keyed open map used for request payloads and response metadata.
pub type Payload = Map<String, Value>;

/// One unit of work entering the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Kind of operation (e.g. "chat", "doc_parse")
    #[serde(default)]
    pub mode: String,
    /// Logical requester role
    #[serde(default)]
    pub agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Origin channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Arbitrary structured data; never absent, `null` becomes an empty map
    #[serde(default, deserialize_with = "null_as_empty")]
    pub payload: Payload,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Payload, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Payload>::deserialize(deserializer)?.unwrap_or_default())
}

impl DispatchRequest {
    pub fn new(mode: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            agent: agent.into(),
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set a single payload entry, replacing any previous value.
    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Payload value for `key` when it is a non-empty string.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Tenant and user ids, only when both are present and non-empty.
    pub fn identity(&self) -> Option<(&str, &str)> {
        let tenant = self.tenant_id.as_deref().filter(|s| !s.is_empty())?;
        let user = self.user_id.as_deref().filter(|s| !s.is_empty())?;
        Some((tenant, user))
    }
}

/// Result of a dispatch.
///
/// Built through [`DispatchResponse::success`] and
/// [`DispatchResponse::failure`], so `data` is set exactly when `ok` is true
/// and `error` exactly when it is false. Deserialization enforces the same
/// shape; a success without `data` carries `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawResponse")]
pub struct DispatchResponse {
    ok: bool,
    provider_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    metadata: Payload,
}

/// Wire shape of [`DispatchResponse`] before the `ok` invariant is checked.
#[derive(Deserialize)]
struct RawResponse {
    ok: bool,
    provider_id: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    metadata: Payload,
}

impl TryFrom<RawResponse> for DispatchResponse {
    type Error = String;

    fn try_from(raw: RawResponse) -> Result<Self, Self::Error> {
        let response = match (raw.ok, raw.data, raw.error) {
            (true, data, None) => Self::success(raw.provider_id, data.unwrap_or(Value::Null)),
            (true, _, Some(_)) => return Err("a successful response cannot carry `error`".to_string()),
            (false, None, Some(error)) => Self::failure(raw.provider_id, error),
            (false, Some(_), _) => return Err("a failed response cannot carry `data`".to_string()),
            (false, None, None) => return Err("a failed response must carry `error`".to_string()),
        };
        Ok(Self {
            metadata: raw.metadata,
            ..response
        })
    }
}

impl DispatchResponse {
    pub fn success(provider_id: impl Into<String>, data: Value) -> Self {
        Self {
            ok: true,
            provider_id: provider_id.into(),
            data: Some(data),
            error: None,
            metadata: Payload::new(),
        }
    }

    pub fn failure(provider_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            provider_id: provider_id.into(),
            data: None,
            error: Some(error.into()),
            metadata: Payload::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn ok(&self) -> bool {
        self.ok
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn metadata(&self) -> &Payload {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_payload_defaults_to_empty() {
        let request: DispatchRequest = serde_json::from_str(r#"{"mode":"chat","agent":"bot"}"#).unwrap();
        assert!(request.payload.is_empty());
    }

    #[test]
    fn test_request_null_payload_becomes_empty() {
        let request: DispatchRequest =
            serde_json::from_str(r#"{"mode":"chat","agent":"bot","payload":null}"#).unwrap();
        assert!(request.payload.is_empty());
    }

    #[test]
    fn test_payload_str_ignores_non_strings() {
        let request = DispatchRequest::new("chat", "bot")
            .with_payload("provider", "llm_a")
            .with_payload("count", 3)
            .with_payload("blank", "");

        assert_eq!(request.payload_str("provider"), Some("llm_a"));
        assert_eq!(request.payload_str("count"), None);
        assert_eq!(request.payload_str("blank"), None);
        assert_eq!(request.payload_str("missing"), None);
    }

    #[test]
    fn test_identity_requires_both_ids() {
        let request = DispatchRequest::new("chat", "bot").with_tenant("t1");
        assert!(request.identity().is_none());

        let request = request.with_user("");
        assert!(request.identity().is_none());

        let request = DispatchRequest::new("chat", "bot")
            .with_tenant("t1")
            .with_user("u1");
        assert_eq!(request.identity(), Some(("t1", "u1")));
    }

    #[test]
    fn test_success_response_shape() {
        let response = DispatchResponse::success("llm_a", json!({"content": "hi"}))
            .with_metadata("kind", "llm");

        assert!(response.ok());
        assert_eq!(response.provider_id(), "llm_a");
        assert!(response.error().is_none());
        assert_eq!(response.metadata()["kind"], "llm");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], true);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_response_shape() {
        let response = DispatchResponse::failure("dispatcher", "routing_error: nope");

        assert!(!response.ok());
        assert!(response.data().is_none());
        assert_eq!(response.error(), Some("routing_error: nope"));
        assert!(response.metadata().is_empty());

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["metadata"], json!({}));
    }

    #[test]
    fn test_response_deserialization_enforces_ok_shape() {
        for invalid in [
            r#"{"ok":true,"provider_id":"p","error":"x"}"#,
            r#"{"ok":false,"provider_id":"p","data":{"a":1},"error":"x"}"#,
            r#"{"ok":false,"provider_id":"p"}"#,
        ] {
            assert!(
                serde_json::from_str::<DispatchResponse>(invalid).is_err(),
                "accepted {}",
                invalid
            );
        }
    }

    #[test]
    fn test_response_deserialization_accepts_valid_shapes() {
        let success: DispatchResponse =
            serde_json::from_str(r#"{"ok":true,"provider_id":"p","data":null,"metadata":{"kind":"llm"}}"#)
                .unwrap();
        assert!(success.ok());
        assert_eq!(success.data(), Some(&Value::Null));
        assert_eq!(success.metadata()["kind"], "llm");

        let failure: DispatchResponse =
            serde_json::from_str(r#"{"ok":false,"provider_id":"p","error":"boom","metadata":null}"#)
                .unwrap();
        assert_eq!(failure.error(), Some("boom"));
        assert!(failure.metadata().is_empty());
    }
}
