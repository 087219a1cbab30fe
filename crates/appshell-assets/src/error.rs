//! Asset and scheme error types

use thiserror::Error;

/// Errors turning a request URL into a file path
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unexpected scheme: expected {expected}, got {found}")]
    SchemeMismatch { expected: String, found: String },

    #[error("Path is not valid UTF-8 after decoding: {0}")]
    InvalidEncoding(String),

    #[error("Path escapes the asset root: {0}")]
    OutsideRoot(String),
}

pub type AssetResult<T> = Result<T, AssetError>;

/// Errors raised by the scheme registry
#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("Scheme {0} must be declared privileged before the host is ready")]
    AfterReady(String),

    #[error("Protocol for scheme {0} can only be registered once the host is ready")]
    NotReady(String),

    #[error("Scheme {0} is not declared as a privileged standard scheme")]
    NotPrivileged(String),

    #[error("Scheme {0} already has a protocol handler")]
    AlreadyRegistered(String),

    #[error("No protocol handler for scheme {0}")]
    Unhandled(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

pub type SchemeResult<T> = Result<T, SchemeError>;
