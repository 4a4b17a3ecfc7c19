//! Error types shared across the crate.
//!
//! Gameplay never produces errors: bad frame input is clamped at the
//! component boundary.  Only startup (config), persistence and the
//! front-end collaborators can fail.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("high score store io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode high score record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("high score store rejected the write")]
    Rejected,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("input provider failed: {0}")]
    Input(#[source] std::io::Error),
    #[error("renderer failed: {0}")]
    Render(#[source] std::io::Error),
}
