//! CLI module for Conduit
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the dispatch server
//! - `route` - Dry-run routing for one request without invoking a provider
//! - `providers` - List the providers a configuration registers
//!
//! # Example
//!
//! ```bash
//! # Start server with default config
//! conduit serve
//!
//! # Which provider would handle this request?
//! conduit route -c conduit.toml --request '{"mode":"chat","agent":"support"}'
//! ```

pub mod output;
pub mod providers;
pub mod route;
pub mod serve;

use crate::config::ConduitConfig;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Conduit - request routing and provider dispatch
#[derive(Parser, Debug)]
#[command(
    name = "conduit",
    version,
    about = "Rule-based request routing and provider dispatch"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the dispatch server
    Serve(ServeArgs),
    /// Resolve a request against the routing rules without invoking it
    Route(RouteArgs),
    /// List registered providers
    Providers(ProvidersArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "conduit.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "CONDUIT_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "CONDUIT_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CONDUIT_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "conduit.toml")]
    pub config: PathBuf,

    /// Request envelope as JSON
    #[arg(short, long)]
    pub request: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ProvidersArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "conduit.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Load and validate the configuration at `path`, falling back to defaults
/// when the file does not exist.
pub fn load_config(path: &Path) -> Result<ConduitConfig, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        ConduitConfig::load(Some(path))?
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        ConduitConfig::default()
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}
