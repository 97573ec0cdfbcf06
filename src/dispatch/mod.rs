//! Dispatch controller
//!
//! [`Dispatcher::handle`] is the single entry point of the engine: it enriches
//! chat requests with access-control facts, resolves a provider through the
//! routing table, invokes it, and always returns a response envelope.

use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

use crate::envelope::{DispatchRequest, DispatchResponse};
use crate::logging::{generate_request_id, message_preview, response_status};
use crate::rbac::{AccessControlResolver, RbacContext};
use crate::routing::{RoutingError, RoutingTable};

/// `provider_id` of failures produced by the dispatcher itself.
pub const DISPATCHER_PROVIDER_ID: &str = "dispatcher";

/// Error prefix of routing failures.
pub const ROUTING_ERROR_PREFIX: &str = "routing_error: ";

/// Error prefix of failures caught around a provider invocation.
pub const INTERNAL_ERROR_PREFIX: &str = "internal_error: ";

/// Only requests of this mode receive access-control context.
pub const RBAC_MODE: &str = "chat";

/// Payload map that receives injected context.
pub const CONTEXT_FIELD: &str = "context";

/// Key of the access-control facts inside `payload.context`.
pub const RBAC_FIELD: &str = "rbac";

/// Orchestrates augmentation, resolution and invocation for one request.
pub struct Dispatcher {
    routing: Arc<RoutingTable>,
    access_control: Option<Arc<dyn AccessControlResolver>>,
    enable_content_logging: bool,
}

impl Dispatcher {
    pub fn new(routing: Arc<RoutingTable>) -> Self {
        Self {
            routing,
            access_control: None,
            enable_content_logging: false,
        }
    }

    /// Enable context augmentation through `resolver`.
    pub fn with_access_control(mut self, resolver: Arc<dyn AccessControlResolver>) -> Self {
        self.access_control = Some(resolver);
        self
    }

    /// Include a message preview in the dispatch log line.
    pub fn with_content_logging(mut self, enabled: bool) -> Self {
        self.enable_content_logging = enabled;
        self
    }

    pub fn routing(&self) -> &Arc<RoutingTable> {
        &self.routing
    }

    /// Handle one request. Never fails and never panics past this call.
    pub async fn handle(&self, request: DispatchRequest) -> DispatchResponse {
        let request_id = generate_request_id();
        let span = tracing::info_span!(
            "dispatch",
            request_id = %request_id,
            mode = %request.mode,
            agent = %request.agent,
        );

        self.handle_inner(request).instrument(span).await
    }

    async fn handle_inner(&self, mut request: DispatchRequest) -> DispatchResponse {
        tracing::info!(
            source = request.source.as_deref().unwrap_or("-"),
            preview = message_preview(&request, self.enable_content_logging).as_deref(),
            "Dispatch started"
        );

        self.augment(&mut request).await;

        let resolution = match self.routing.resolve(&request) {
            Ok(resolution) => resolution,
            Err(e) => return routing_failure(e),
        };

        let provider = Arc::clone(&resolution.descriptor.provider);
        let outcome = AssertUnwindSafe(provider.invoke(&request))
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(response) => response,
            Err(panic) => {
                tracing::error!(
                    provider_id = %resolution.provider_id(),
                    rule_id = %resolution.rule_id,
                    panic = %panic_message(panic.as_ref()),
                    "Provider invocation panicked"
                );
                return DispatchResponse::failure(
                    DISPATCHER_PROVIDER_ID,
                    format!("{}provider invocation failed", INTERNAL_ERROR_PREFIX),
                )
                .with_metadata("error_kind", "internal");
            }
        };

        let (status, error) = response_status(&response);
        tracing::info!(
            provider_id = %response.provider_id(),
            rule_id = %resolution.rule_id,
            used_default = resolution.used_default,
            status,
            error,
            "Dispatch completed"
        );
        response
    }

    /// Best-effort injection of access-control facts into `payload.context.rbac`.
    async fn augment(&self, request: &mut DispatchRequest) {
        let Some(resolver) = self.access_control.as_ref() else {
            return;
        };
        if request.mode != RBAC_MODE {
            return;
        }
        let Some((tenant_id, user_id)) = request.identity() else {
            return;
        };
        let (tenant_id, user_id) = (tenant_id.to_string(), user_id.to_string());

        match resolver.resolve(&tenant_id, &user_id).await {
            Ok(context) if context.tenant_id != tenant_id || context.user_id != user_id => {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    user_id = %user_id,
                    returned_tenant_id = %context.tenant_id,
                    returned_user_id = %context.user_id,
                    "Access-control context is for another identity; discarding it"
                )
            }
            Ok(context) => inject_rbac(request, &context),
            Err(e) => tracing::warn!(
                tenant_id = %tenant_id,
                user_id = %user_id,
                error = %e,
                "Access-control lookup failed; continuing without context"
            ),
        }
    }
}

/// Add `rbac` to `payload.context`, keeping any other context keys.
///
/// A `context` entry that is not a map is left untouched.
pub fn inject_rbac(request: &mut DispatchRequest, context: &RbacContext) {
    let rbac = match serde_json::to_value(context) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize access-control context");
            return;
        }
    };

    let entry = request
        .payload
        .entry(CONTEXT_FIELD)
        .or_insert_with(|| Value::Object(Default::default()));
    if entry.is_null() {
        *entry = Value::Object(Default::default());
    }
    match entry.as_object_mut() {
        Some(map) => {
            map.insert(RBAC_FIELD.to_string(), rbac);
        }
        None => tracing::warn!("payload.context is not an object; skipping access-control context"),
    }
}

fn routing_failure(error: RoutingError) -> DispatchResponse {
    if error.is_configuration_error() {
        tracing::error!(error_kind = error.kind(), error = %error, "Routing failed");
    } else {
        tracing::warn!(error_kind = error.kind(), error = %error, "Routing failed");
    }
    DispatchResponse::failure(
        DISPATCHER_PROVIDER_ID,
        format!("{}{}", ROUTING_ERROR_PREFIX, error),
    )
    .with_metadata("error_kind", error.kind())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
