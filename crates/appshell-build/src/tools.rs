//! External build tools
//!
//! The frontend bundler and the packager are external programs. The pipeline
//! talks to them through [`Bundler`] and [`Packager`] so it can run against
//! anything that produces the same files.

use crate::error::{BuildError, BuildResult};
use appshell_core::ToolCommand;
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Produces static frontend assets
pub trait Bundler {
    /// Bundle the frontend into `out_dir`, prefixing every asset reference
    /// with `base`
    fn bundle(&self, base: &str, out_dir: &Path) -> impl Future<Output = BuildResult<()>>;
}

/// Turns a staged app directory into distributable artifacts
pub trait Packager {
    fn package(&self, target: &PackageTarget) -> impl Future<Output = BuildResult<()>>;
}

/// Directories handed to the packager
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageTarget {
    pub directories: PackageDirectories,
    /// Glob filter of staged files to include
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDirectories {
    /// Staged app
    pub app: PathBuf,
    /// Where artifacts are written
    pub output: PathBuf,
}

impl PackageTarget {
    /// Package everything under `app` into `output`
    pub fn new(app: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            directories: PackageDirectories {
                app: app.into(),
                output: output.into(),
            },
            files: vec!["**".to_string()],
        }
    }

    /// Dotted `--config.*` overrides understood by the packager CLI
    pub fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--config.directories.app={}", self.directories.app.display()),
            format!(
                "--config.directories.output={}",
                self.directories.output.display()
            ),
        ];
        args.extend(self.files.iter().map(|f| format!("--config.files={}", f)));
        args
    }
}

/// Bundler backed by an external command (`npx vite build` by default)
#[derive(Debug, Clone)]
pub struct CommandBundler {
    command: ToolCommand,
    cwd: PathBuf,
}

impl CommandBundler {
    pub fn new(command: ToolCommand, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command,
            cwd: cwd.into(),
        }
    }
}

impl Bundler for CommandBundler {
    async fn bundle(&self, base: &str, out_dir: &Path) -> BuildResult<()> {
        let extra = vec![
            "--base".to_string(),
            base.to_string(),
            "--outDir".to_string(),
            out_dir.display().to_string(),
        ];
        run_tool(&self.command, &extra, &self.cwd).await
    }
}

/// Packager backed by an external command (`npx electron-builder` by default)
#[derive(Debug, Clone)]
pub struct CommandPackager {
    command: ToolCommand,
    cwd: PathBuf,
}

impl CommandPackager {
    pub fn new(command: ToolCommand, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command,
            cwd: cwd.into(),
        }
    }
}

impl Packager for CommandPackager {
    async fn package(&self, target: &PackageTarget) -> BuildResult<()> {
        run_tool(&self.command, &target.to_cli_args(), &self.cwd).await
    }
}

/// Resolve a program through PATH (including PATHEXT on Windows)
pub(crate) fn resolve_program(program: &str) -> BuildResult<PathBuf> {
    which::which(program).map_err(|_| BuildError::ToolNotFound(program.to_string()))
}

/// Run a tool to completion with inherited output
pub(crate) async fn run_tool(command: &ToolCommand, extra: &[String], cwd: &Path) -> BuildResult<()> {
    let program = resolve_program(&command.program)?;
    let rendered = format!("{} {}", command, extra.join(" "));
    let rendered = rendered.trim_end();
    info!("Running: {}", rendered);

    let status = Command::new(&program)
        .args(&command.args)
        .args(extra)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|source| BuildError::CommandSpawn {
            command: command.program.clone(),
            source,
        })?;

    if !status.success() {
        return Err(BuildError::CommandFailed {
            command: rendered.to_string(),
            status: status.to_string(),
        });
    }

    debug!("{} finished: {}", command.program, status);
    Ok(())
}
