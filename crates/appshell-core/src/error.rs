//! Error types for appshell

use thiserror::Error;

/// Main error type for appshell core operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IPC error: {0}")]
    Ipc(String),
}

/// Result type alias using appshell's Error
pub type Result<T> = std::result::Result<T, Error>;
