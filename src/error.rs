//! Error types for the CDS explorer.

use std::path::PathBuf;
use thiserror::Error;

/// Settings and cdsrc loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid `current` marker in {path:?}: expected a string")]
    InvalidCurrent { path: PathBuf },

    #[error("Invalid settings: {0}")]
    Invalid(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),
}

/// Failures invoking cdsctl
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to spawn {binary:?}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cdsctl `{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("cdsctl `{command}` produced non UTF-8 output")]
    InvalidOutput { command: String },

    #[error("Context {context} has no UI URL configured")]
    MissingUiUrl { context: String },
}

/// JSON shape errors at the decode boundary
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to decode `{command}` output: {source}")]
    Json {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected `{command}` output: {reason}")]
    Shape { command: String, reason: String },
}

/// Top level error surfaced to tree hosts
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Context not found: {0}")]
    ContextNotFound(String),

    #[error("No active context; pass --context")]
    NoActiveContext,

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Output rendering failed: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<config::ConfigError> for ExplorerError {
    fn from(err: config::ConfigError) -> Self {
        ExplorerError::Config(ConfigError::Settings(err))
    }
}
