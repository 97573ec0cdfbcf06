//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading or validating `conduit.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("config file '{}' is not valid TOML: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// `field` is the dotted path into the config, e.g. `routing.rules[2].id`
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{section} '{name}' is defined more than once")]
    DuplicateName { section: String, name: String },
}
