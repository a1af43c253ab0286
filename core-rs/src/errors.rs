//! Error types for the port registry
//!
//! Exhaustion and invalid release are not errors: they come back as
//! `None` / `false` from the registry. Only construction and configuration
//! failures use this type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortError {
    #[error("Invalid port range: {0}")]
    InvalidRange(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Sweeper error: {0}")]
    SweeperError(String),
}

pub type Result<T> = std::result::Result<T, PortError>;
