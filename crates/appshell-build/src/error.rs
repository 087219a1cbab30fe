//! Build error types

use crate::pipeline::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a build or dev session
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("Invalid manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("Runtime file missing: {0}")]
    MissingRuntimeFile(PathBuf),

    #[error("{0} not found in PATH")]
    ToolNotFound(String),

    #[error("Failed to start {command}: {source}")]
    CommandSpawn {
        command: String,
        source: std::io::Error,
    },

    #[error("Command failed: {command} ({status})")]
    CommandFailed { command: String, status: String },

    #[error("Invalid rewrite pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Config(#[from] appshell_core::Error),

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: Stage,
        source: Box<BuildError>,
    },
}

pub type BuildResult<T> = Result<T, BuildError>;

impl BuildError {
    /// Adapter for `map_err` attaching the path an I/O call worked on
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| BuildError::Io { path, source }
    }
}
