//! Output formatting helpers for CLI commands

use crate::registry::ProviderDescriptor;
use crate::routing::{Resolution, RoutingError};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::json;

/// View model for provider display
#[derive(Debug, Clone, Serialize)]
pub struct ProviderView {
    pub id: String,
    pub kind: String,
}

impl From<&ProviderDescriptor> for ProviderView {
    fn from(descriptor: &ProviderDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            kind: descriptor.kind.to_string(),
        }
    }
}

/// View model for a dry-run routing outcome
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteView {
    Resolved {
        rule_id: String,
        provider_id: String,
        provider_kind: String,
        used_default: bool,
    },
    Failed {
        error_kind: String,
        error: String,
    },
}

impl RouteView {
    pub fn is_resolved(&self) -> bool {
        matches!(self, RouteView::Resolved { .. })
    }
}

impl From<&Result<Resolution, RoutingError>> for RouteView {
    fn from(outcome: &Result<Resolution, RoutingError>) -> Self {
        match outcome {
            Ok(resolution) => RouteView::Resolved {
                rule_id: resolution.rule_id.clone(),
                provider_id: resolution.provider_id().to_string(),
                provider_kind: resolution.descriptor.kind.to_string(),
                used_default: resolution.used_default,
            },
            Err(e) => RouteView::Failed {
                error_kind: e.kind().to_string(),
                error: e.to_string(),
            },
        }
    }
}

/// Format providers as a table
pub fn format_providers_table(providers: &[ProviderView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Provider", "Kind"]);

    for p in providers {
        table.add_row(vec![Cell::new(&p.id), Cell::new(&p.kind)]);
    }

    table.to_string()
}

/// Format providers as JSON
pub fn format_providers_json(providers: &[ProviderView]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({ "providers": providers }))
}

/// Format a routing outcome as a two-column table
pub fn format_route_table(route: &RouteView) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    match route {
        RouteView::Resolved {
            rule_id,
            provider_id,
            provider_kind,
            used_default,
        } => {
            table.add_row(vec![Cell::new("rule"), Cell::new(rule_id)]);
            table.add_row(vec![Cell::new("provider"), Cell::new(provider_id)]);
            table.add_row(vec![Cell::new("kind"), Cell::new(provider_kind)]);
            table.add_row(vec![Cell::new("default fallback"), Cell::new(used_default)]);
        }
        RouteView::Failed { error_kind, error } => {
            table.add_row(vec![Cell::new("error kind"), Cell::new(error_kind)]);
            table.add_row(vec![Cell::new("error"), Cell::new(error)]);
        }
    }

    table.to_string()
}

/// Format a routing outcome as JSON
pub fn format_route_json(route: &RouteView) -> serde_json::Result<String> {
    serde_json::to_string_pretty(route)
}
