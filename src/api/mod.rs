//! # HTTP entry point
//!
//! Exposes the dispatcher over HTTP.
//!
//! ## Endpoints
//!
//! - `POST /v1/dispatch` - Dispatch one request envelope
//! - `GET /v1/providers` - List registered providers
//! - `GET /health` - Liveness plus provider and rule counts
//!
//! Dispatch always answers `200 OK`: success or failure travels in the
//! response envelope's `ok` flag, with routing failures distinguishable by
//! their `routing_error: ` prefix.
//!
//! ## Example
//!
//! ```no_run
//! use conduit::api::{create_router, AppState};
//! use conduit::config::ConduitConfig;
//! use conduit::secrets::EnvSecrets;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(ConduitConfig::default());
//! let state = Arc::new(AppState::from_config(config, Arc::new(EnvSecrets))?);
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8700").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod dispatch;
mod health;
mod providers;
pub mod types;

pub use types::*;

use crate::config::ConduitConfig;
use crate::dispatch::Dispatcher;
use crate::rbac::HttpAccessControlResolver;
use crate::registry::ProviderRegistry;
use crate::routing::RoutingTable;
use crate::secrets::SecretLookup;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (10 MB).
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<ConduitConfig>,
    pub dispatcher: Arc<Dispatcher>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Wrap an already-built dispatcher.
    pub fn new(config: Arc<ConduitConfig>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            config,
            dispatcher,
            start_time: Instant::now(),
        }
    }

    /// Build the HTTP client, registry, routing table and dispatcher from
    /// configuration.
    pub fn from_config(
        config: Arc<ConduitConfig>,
        secrets: Arc<dyn SecretLookup>,
    ) -> Result<Self, reqwest::Error> {
        let client = Arc::new(
            reqwest::Client::builder()
                .timeout(Duration::from_secs(config.server.request_timeout_seconds))
                .pool_max_idle_per_host(10)
                .build()?,
        );

        let registry = Arc::new(ProviderRegistry::from_config(
            &config,
            secrets.as_ref(),
            Arc::clone(&client),
        ));
        let table = RoutingTable::from_config(&config.routing.rules, registry, secrets);

        let mut dispatcher = Dispatcher::new(Arc::new(table))
            .with_content_logging(config.logging.enable_content_logging);
        if let Some(rbac) = &config.rbac {
            dispatcher = dispatcher.with_access_control(Arc::new(
                HttpAccessControlResolver::from_config(rbac, Arc::clone(&client)),
            ));
        }

        Ok(Self::new(config, Arc::new(dispatcher)))
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        self.dispatcher.routing().registry()
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/dispatch", post(dispatch::handle))
        .route("/v1/providers", get(providers::handle))
        .route("/health", get(health::handle))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
