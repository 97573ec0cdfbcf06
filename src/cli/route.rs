//! Route command implementation
//!
//! Resolves one request against the configured rules and registry without
//! invoking the provider.

use crate::cli::output::{format_route_json, format_route_table, RouteView};
use crate::cli::{load_config, RouteArgs};
use crate::envelope::DispatchRequest;
use crate::registry::ProviderRegistry;
use crate::routing::RoutingTable;
use crate::secrets::EnvSecrets;
use std::sync::Arc;

/// Rendered dry-run result.
#[derive(Debug)]
pub struct RouteReport {
    pub output: String,
    /// False when routing failed; the binary exits with status 1
    pub resolved: bool,
}

/// Handle route command
pub fn handle_route(args: &RouteArgs) -> Result<RouteReport, Box<dyn std::error::Error>> {
    let request: DispatchRequest = serde_json::from_str(&args.request)
        .map_err(|e| format!("Invalid request JSON: {}", e))?;

    let config = load_config(&args.config)?;
    let client = Arc::new(reqwest::Client::builder().build()?);
    let secrets = Arc::new(EnvSecrets);
    let registry = Arc::new(ProviderRegistry::from_config(&config, secrets.as_ref(), client));
    let table = RoutingTable::from_config(&config.routing.rules, registry, secrets);

    let view = RouteView::from(&table.resolve(&request));
    let output = if args.json {
        format_route_json(&view)?
    } else {
        format_route_table(&view)
    };

    Ok(RouteReport {
        output,
        resolved: view.is_resolved(),
    })
}
