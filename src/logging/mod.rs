//! Structured logging helpers
//!
//! Filter construction for the subscriber, dispatch correlation ids and
//! privacy-aware field extraction.

pub mod fields;
pub mod request_id;

pub use fields::{message_preview, response_status};
pub use request_id::generate_request_id;

/// Build filter directives string from LoggingConfig
///
/// Combines the base level with per-component levels, each scoped to this
/// crate's module path.
///
/// # Examples
///
/// ```
/// use conduit::config::logging::{LogFormat, LoggingConfig};
/// use conduit::logging::build_filter_directives;
/// use std::collections::BTreeMap;
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: BTreeMap::from([("routing".to_string(), "debug".to_string())]),
///     enable_content_logging: false,
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,conduit::routing=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    for (component, level) in &config.component_levels {
        filter_str.push_str(&format!(",conduit::{}={}", component, level));
    }

    filter_str
}
