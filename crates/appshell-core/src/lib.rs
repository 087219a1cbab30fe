//! appshell Core - Shared types and protocol definitions
//!
//! This crate provides the configuration, IPC message types and errors used
//! by the asset server, the main process and the build pipeline.

pub mod config;
pub mod error;
pub mod protocol;

pub use config::{BuildConfig, Mode, ServeConfig, ShellConfig, ToolCommand};
pub use error::{Error, Result};
pub use protocol::{IpcInvoke, IpcReply};
