//! Access-control context lookup.
//!
//! The dispatcher asks an [`AccessControlResolver`] for role and entitlement
//! facts about the calling user before routing chat requests. Failures are
//! the dispatcher's to swallow; resolvers only report them.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::RbacConfig;
use crate::provider::http::segment_url;

/// Roles and entitlements of one user within one tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacContext {
    pub tenant_id: String,
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub entitlements: Vec<String>,
}

#[derive(Debug, Error)]
pub enum RbacError {
    #[error("access-control service unreachable: {0}")]
    Network(String),

    #[error("access-control lookup timed out after {0}ms")]
    Timeout(u64),

    #[error("access-control service returned {status}")]
    Upstream { status: u16 },

    #[error("invalid access-control response: {0}")]
    InvalidResponse(String),

    #[error("invalid access-control identity: {0}")]
    InvalidIdentity(String),
}

/// Resolves access-control facts for a tenant/user pair.
///
/// Implementations own their timeout.
#[async_trait]
pub trait AccessControlResolver: Send + Sync + 'static {
    async fn resolve(&self, tenant_id: &str, user_id: &str) -> Result<RbacContext, RbacError>;
}

/// Resolver backed by the access-control HTTP service.
///
/// Calls `GET {base_url}/v1/rbac/tenants/{tenant_id}/users/{user_id}`, with
/// each id percent-encoded as a single path segment.
pub struct HttpAccessControlResolver {
    base_url: String,
    timeout: Duration,
    client: Arc<Client>,
}

impl HttpAccessControlResolver {
    pub fn new(base_url: String, timeout: Duration, client: Arc<Client>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        }
    }

    pub fn from_config(config: &RbacConfig, client: Arc<Client>) -> Self {
        Self::new(
            config.base_url.clone(),
            Duration::from_millis(config.timeout_ms),
            client,
        )
    }
}

#[async_trait]
impl AccessControlResolver for HttpAccessControlResolver {
    async fn resolve(&self, tenant_id: &str, user_id: &str) -> Result<RbacContext, RbacError> {
        let url = segment_url(
            &self.base_url,
            &["v1", "rbac", "tenants", tenant_id, "users", user_id],
        )
        .map_err(RbacError::InvalidIdentity)?;
        let timeout_ms = self.timeout.as_millis() as u64;

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RbacError::Timeout(timeout_ms)
                } else {
                    RbacError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RbacError::Upstream {
                status: status.as_u16(),
            });
        }

        response
            .json::<RbacContext>()
            .await
            .map_err(|e| RbacError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn resolver(base_url: String) -> HttpAccessControlResolver {
        HttpAccessControlResolver::new(base_url, Duration::from_secs(2), Arc::new(Client::new()))
    }

    #[tokio::test]
    async fn test_resolve_context() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/rbac/tenants/acme/users/u1")
            .with_status(200)
            .with_body(
                r#"{"tenant_id":"acme","user_id":"u1","roles":["admin"],"entitlements":["docs"]}"#,
            )
            .create_async()
            .await;

        let context = resolver(server.url()).resolve("acme", "u1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(context.roles, vec!["admin"]);
        assert_eq!(context.entitlements, vec!["docs"]);
    }

    #[tokio::test]
    async fn test_missing_lists_default_to_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/rbac/tenants/acme/users/u1")
            .with_status(200)
            .with_body(r#"{"tenant_id":"acme","user_id":"u1"}"#)
            .create_async()
            .await;

        let context = resolver(server.url()).resolve("acme", "u1").await.unwrap();
        assert!(context.roles.is_empty());
        assert!(context.entitlements.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/rbac/tenants/acme/users/ghost")
            .with_status(404)
            .create_async()
            .await;

        let err = resolver(server.url())
            .resolve("acme", "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, RbacError::Upstream { status: 404 }));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let err = resolver("http://127.0.0.1:1".to_string())
            .resolve("acme", "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, RbacError::Network(_)));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/rbac/tenants/acme/users/u1")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = resolver(server.url()).resolve("acme", "u1").await.unwrap_err();
        assert!(matches!(err, RbacError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_path_characters_in_ids_stay_in_one_segment() {
        let mut server = Server::new_async().await;
        let admin = server
            .mock("GET", "/v1/rbac/tenants/acme/users/admin")
            .with_status(200)
            .with_body(r#"{"tenant_id":"acme","user_id":"admin","roles":["admin"]}"#)
            .expect(0)
            .create_async()
            .await;
        let escaped = server
            .mock(
                "GET",
                Matcher::Regex(r"^/v1/rbac/tenants/acme/users/mallory%2F\.\.%2Fadmin$".to_string()),
            )
            .with_status(404)
            .create_async()
            .await;

        let err = resolver(server.url())
            .resolve("acme", "mallory/../admin")
            .await
            .unwrap_err();

        admin.assert_async().await;
        escaped.assert_async().await;
        assert!(matches!(err, RbacError::Upstream { status: 404 }));
    }

    #[tokio::test]
    async fn test_dot_segment_ids_rejected_before_any_call() {
        let mut server = Server::new_async().await;
        let any = server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        for (tenant, user) in [("acme", ".."), ("..", "u1"), ("acme", ".")] {
            let err = resolver(server.url()).resolve(tenant, user).await.unwrap_err();
            assert!(matches!(err, RbacError::InvalidIdentity(_)));
        }

        any.assert_async().await;
    }
}
