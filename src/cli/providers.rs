//! Providers command implementation

use crate::cli::output::{format_providers_json, format_providers_table, ProviderView};
use crate::cli::{load_config, ProvidersArgs};
use crate::registry::ProviderRegistry;
use crate::secrets::EnvSecrets;
use std::sync::Arc;

/// Handle providers command
pub fn handle_providers(args: &ProvidersArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let client = Arc::new(reqwest::Client::builder().build()?);
    let registry = ProviderRegistry::from_config(&config, &EnvSecrets, client);

    let views: Vec<ProviderView> = registry
        .descriptors()
        .into_iter()
        .map(ProviderView::from)
        .collect();

    if args.json {
        Ok(format_providers_json(&views)?)
    } else {
        Ok(format_providers_table(&views))
    }
}
