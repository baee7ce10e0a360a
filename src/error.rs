use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum MediatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Journal error: {0}")]
    Journal(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bridge error: {0}")]
    Bridge(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MediatorError>;
