//! Configuration types for appshell

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable selecting the runtime mode
pub const MODE_ENV: &str = "MODE";

/// Scheme the packaged frontend is served from
pub const DEFAULT_SCHEME: &str = "app";

/// Base URL prefix the bundler writes in front of every asset reference
pub const DEFAULT_BASE: &str = "app://./";

/// Dev server address the bundler listens on in development
pub const DEFAULT_DEV_SERVER_URL: &str = "http://0.0.0.0:3000";

/// Runtime mode of the main process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Load the dev server, no custom scheme
    Development,
    /// Serve the bundled frontend over the custom scheme
    #[default]
    Production,
}

impl Mode {
    /// Read the mode from `MODE`. Only the exact value `development`
    /// selects development mode.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(MODE_ENV).ok().as_deref())
    }

    /// Resolve a raw `MODE` value
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("development") => Mode::Development,
            _ => Mode::Production,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Mode::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            _ => Err(format!("Invalid mode: {}. Use: development, production", s)),
        }
    }
}

/// An external program plus its fixed leading arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Builder pattern: append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Builder pattern: append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Configuration of the build pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Project root holding the manifest and the runtime directory
    pub project_dir: PathBuf,
    /// Output directory for packaged artifacts, relative to the project
    pub dist_dir: String,
    /// Staging directory name inside `dist_dir`
    pub staging_dir: String,
    /// Base URL prefix handed to the bundler
    pub base: String,
    /// Directory holding the runtime entry files, relative to the project
    pub runtime_dir: String,
    /// Runtime files copied into the staging root
    pub runtime_files: Vec<String>,
    /// File the staged manifest points `main` at
    pub runtime_entry: String,
    /// Project manifest file name
    pub manifest: String,
    /// Placeholder dependency directory created inside staging
    pub dependency_stub: String,
    /// Frontend bundler invocation (output options are appended)
    pub bundler: ToolCommand,
    /// Packaging tool invocation (directory options are appended)
    pub packager: ToolCommand,
}

impl BuildConfig {
    /// Create a configuration with default values rooted at `project_dir`
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            dist_dir: "dist".to_string(),
            staging_dir: "bundled".to_string(),
            base: DEFAULT_BASE.to_string(),
            runtime_dir: "main".to_string(),
            runtime_files: vec!["index.js".to_string(), "preload.js".to_string()],
            runtime_entry: "index.js".to_string(),
            manifest: "package.json".to_string(),
            dependency_stub: "node_modules".to_string(),
            bundler: ToolCommand::new("npx").args(["vite", "build"]),
            packager: ToolCommand::new("npx").arg("electron-builder"),
        }
    }

    /// Builder pattern: set base URL prefix
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Builder pattern: set dist directory
    pub fn with_dist_dir(mut self, dist_dir: impl Into<String>) -> Self {
        self.dist_dir = dist_dir.into();
        self
    }

    /// Builder pattern: set runtime files and the entry among them
    pub fn with_runtime_files(mut self, files: Vec<String>, entry: impl Into<String>) -> Self {
        self.runtime_files = files;
        self.runtime_entry = entry.into();
        self
    }

    /// Builder pattern: set bundler command
    pub fn with_bundler(mut self, bundler: ToolCommand) -> Self {
        self.bundler = bundler;
        self
    }

    /// Builder pattern: set packager command
    pub fn with_packager(mut self, packager: ToolCommand) -> Self {
        self.packager = packager;
        self
    }

    /// Directory receiving packaged artifacts
    pub fn dist_path(&self) -> PathBuf {
        self.project_dir.join(&self.dist_dir)
    }

    /// Directory the bundler writes to and the packager reads from
    pub fn staging_path(&self) -> PathBuf {
        self.dist_path().join(&self.staging_dir)
    }

    pub fn runtime_path(&self) -> PathBuf {
        self.project_dir.join(&self.runtime_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_dir.join(&self.manifest)
    }

    /// Check the configuration before any stage touches the filesystem
    pub fn validate(&self) -> Result<()> {
        if self.base.is_empty() {
            return Err(Error::Config("base prefix must not be empty".to_string()));
        }
        if self.staging_dir.is_empty() || self.dist_dir.is_empty() {
            return Err(Error::Config(
                "dist and staging directories must be named".to_string(),
            ));
        }
        if !self.runtime_files.iter().any(|f| f == &self.runtime_entry) {
            return Err(Error::Config(format!(
                "runtime entry {} is not among the runtime files",
                self.runtime_entry
            )));
        }
        Ok(())
    }
}

/// Configuration of the main process shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Directory the packaged app lives in; doubles as the asset root
    pub app_dir: PathBuf,
    /// Custom scheme name
    pub scheme: String,
    /// Page loaded first over the custom scheme
    pub entry: String,
    /// Dev server URL loaded in development mode
    pub dev_server_url: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Preload bridge script, relative to `app_dir`
    pub preload: String,
}

impl ShellConfig {
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
            scheme: DEFAULT_SCHEME.to_string(),
            entry: "index.html".to_string(),
            dev_server_url: DEFAULT_DEV_SERVER_URL.to_string(),
            width: 800,
            height: 600,
            preload: "preload.js".to_string(),
        }
    }

    /// Builder pattern: set dev server URL
    pub fn with_dev_server_url(mut self, url: impl Into<String>) -> Self {
        self.dev_server_url = url.into();
        self
    }

    /// Builder pattern: set window size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// URL of the entry page over the custom scheme, e.g. `app://./index.html`
    pub fn entry_url(&self) -> String {
        format!("{}://./{}", self.scheme, self.entry)
    }

    pub fn asset_root(&self) -> &Path {
        &self.app_dir
    }

    pub fn preload_path(&self) -> PathBuf {
        self.app_dir.join(&self.preload)
    }
}

/// Configuration of the dev-serve command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    /// Directory both processes run in
    pub project_dir: PathBuf,
    /// Frontend dev server
    pub dev_server: ToolCommand,
    /// Desktop runtime pointed at the project
    pub app_runtime: ToolCommand,
}

impl ServeConfig {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            dev_server: ToolCommand::new("npx").arg("vite"),
            app_runtime: ToolCommand::new("npx").args(["electron", "."]),
        }
    }
}
