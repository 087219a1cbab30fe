//! Main process error types

use appshell_assets::SchemeError;
use appshell_store::StoreError;
use thiserror::Error;

/// Errors raised by the main process
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("No handler for channel: {0}")]
    UnknownChannel(String),

    #[error("Unexpected reply on channel {channel}: {reply}")]
    UnexpectedReply { channel: String, reply: String },

    #[error("IPC bridge closed")]
    BridgeClosed,

    #[error("Counter store still in use at shutdown")]
    StoreInUse,

    #[error("Host runtime error: {0}")]
    Host(String),

    #[error("Scheme error: {0}")]
    Scheme(#[from] SchemeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] appshell_core::Error),
}

pub type ShellResult<T> = Result<T, ShellError>;
