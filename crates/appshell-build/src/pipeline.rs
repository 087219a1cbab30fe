//! Build pipeline
//!
//! Seven stages run strictly in order. The first failure aborts the run and
//! is reported with the stage it happened in.

use crate::error::{BuildError, BuildResult};
use crate::manifest::stage_manifest;
use crate::rewrite::{BasePathFixer, RewriteReport};
use crate::tools::{Bundler, CommandBundler, CommandPackager, PackageTarget, Packager};
use appshell_core::BuildConfig;
use std::fmt;
use std::io::ErrorKind;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A step of the build, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Clean,
    Frontend,
    BasePath,
    RuntimeFiles,
    Manifest,
    DependencyStub,
    Package,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Clean,
        Stage::Frontend,
        Stage::BasePath,
        Stage::RuntimeFiles,
        Stage::Manifest,
        Stage::DependencyStub,
        Stage::Package,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Clean => "clean",
            Stage::Frontend => "frontend",
            Stage::BasePath => "base-path",
            Stage::RuntimeFiles => "runtime-files",
            Stage::Manifest => "manifest",
            Stage::DependencyStub => "dependency-stub",
            Stage::Package => "package",
        }
    }

    /// Human readable progress line
    pub fn description(&self) -> &'static str {
        match self {
            Stage::Clean => "Removing previous output",
            Stage::Frontend => "Bundling frontend",
            Stage::BasePath => "Fixing base path references",
            Stage::RuntimeFiles => "Copying runtime files",
            Stage::Manifest => "Writing manifest",
            Stage::DependencyStub => "Creating dependency stub",
            Stage::Package => "Packaging app",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a finished build
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub rewrite: RewriteReport,
    pub runtime_files: usize,
    pub elapsed: Duration,
}

/// Runs the build for one project
pub struct BuildPipeline<B, P> {
    config: BuildConfig,
    bundler: B,
    packager: P,
}

impl BuildPipeline<CommandBundler, CommandPackager> {
    /// Pipeline driving the configured external commands from the project
    /// directory
    pub fn from_config(config: BuildConfig) -> Self {
        let bundler = CommandBundler::new(config.bundler.clone(), &config.project_dir);
        let packager = CommandPackager::new(config.packager.clone(), &config.project_dir);
        Self::new(config, bundler, packager)
    }
}

impl<B: Bundler, P: Packager> BuildPipeline<B, P> {
    pub fn new(config: BuildConfig, bundler: B, packager: P) -> Self {
        Self {
            config,
            bundler,
            packager,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run every stage in order
    pub async fn run(&self) -> BuildResult<BuildReport> {
        self.config.validate()?;

        let started = Instant::now();
        let mut report = BuildReport::default();
        let total = Stage::ALL.len();

        for (i, stage) in Stage::ALL.into_iter().enumerate() {
            info!("[{}/{}] {}", i + 1, total, stage.description());
            self.run_stage(stage, &mut report)
                .await
                .map_err(|source| BuildError::Stage {
                    stage,
                    source: Box::new(source),
                })?;
        }

        report.elapsed = started.elapsed();
        info!(
            "Build finished in {:.2?}: {}",
            report.elapsed,
            self.config.dist_path().display()
        );
        Ok(report)
    }

    async fn run_stage(&self, stage: Stage, report: &mut BuildReport) -> BuildResult<()> {
        match stage {
            Stage::Clean => self.clean().await,
            Stage::Frontend => {
                self.bundler
                    .bundle(&self.config.base, &self.config.staging_path())
                    .await
            }
            Stage::BasePath => {
                report.rewrite = self.fix_base_path().await?;
                Ok(())
            }
            Stage::RuntimeFiles => {
                report.runtime_files = self.copy_runtime_files().await?;
                Ok(())
            }
            Stage::Manifest => {
                let source = self.config.manifest_path();
                let dest = self.config.staging_path().join(&self.config.manifest);
                let entry = self.config.runtime_entry.clone();
                tokio::task::spawn_blocking(move || stage_manifest(&source, &dest, &entry))
                    .await?
            }
            Stage::DependencyStub => {
                let stub = self.config.staging_path().join(&self.config.dependency_stub);
                tokio::fs::create_dir_all(&stub)
                    .await
                    .map_err(BuildError::io(&stub))
            }
            Stage::Package => {
                let target =
                    PackageTarget::new(self.config.staging_path(), self.config.dist_path());
                self.packager.package(&target).await
            }
        }
    }

    async fn clean(&self) -> BuildResult<()> {
        let dist = self.config.dist_path();
        match tokio::fs::remove_dir_all(&dist).await {
            Ok(()) => {
                debug!("Removed {}", dist.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BuildError::Io {
                path: dist,
                source: e,
            }),
        }
    }

    async fn fix_base_path(&self) -> BuildResult<RewriteReport> {
        let fixer = BasePathFixer::new(self.config.base.clone())?;
        let staging = self.config.staging_path();
        let report = tokio::task::spawn_blocking(move || fixer.fix_tree(&staging)).await??;
        debug!(
            "Scanned {} files, rewrote {} ({} replacements)",
            report.files_scanned, report.files_rewritten, report.replacements
        );
        Ok(report)
    }

    async fn copy_runtime_files(&self) -> BuildResult<usize> {
        let source_dir = self.config.runtime_path();
        let staging = self.config.staging_path();
        tokio::fs::create_dir_all(&staging)
            .await
            .map_err(BuildError::io(&staging))?;

        for name in &self.config.runtime_files {
            let from = source_dir.join(name);
            let to = staging.join(name);
            match tokio::fs::copy(&from, &to).await {
                Ok(_) => debug!("Copied {} -> {}", from.display(), to.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(BuildError::MissingRuntimeFile(from))
                }
                Err(e) => {
                    return Err(BuildError::Io {
                        path: from,
                        source: e,
                    })
                }
            }
        }
        Ok(self.config.runtime_files.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    /// Emits a small frontend with the stray leading slash the real bundler
    /// produces
    #[derive(Default)]
    struct FakeBundler {
        calls: Mutex<Vec<(String, std::path::PathBuf)>>,
        fail: bool,
    }

    impl Bundler for FakeBundler {
        async fn bundle(&self, base: &str, out_dir: &Path) -> BuildResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push((base.to_string(), out_dir.to_path_buf()));
            if self.fail {
                return Err(BuildError::CommandFailed {
                    command: "vite build".to_string(),
                    status: "exit status: 1".to_string(),
                });
            }
            fs::create_dir_all(out_dir.join("assets")).unwrap();
            fs::write(
                out_dir.join("index.html"),
                format!("<script type=\"module\" src=\"/{}assets/index.js\"></script>", base),
            )
            .unwrap();
            fs::write(
                out_dir.join("assets/index.js"),
                format!("import('{}assets/chunk.js')", base),
            )
            .unwrap();
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakePackager {
        targets: Mutex<Vec<PackageTarget>>,
    }

    impl Packager for FakePackager {
        async fn package(&self, target: &PackageTarget) -> BuildResult<()> {
            assert!(target.directories.app.join("package.json").is_file());
            fs::write(target.directories.output.join("app.AppImage"), b"artifact").unwrap();
            self.targets.lock().unwrap().push(target.clone());
            Ok(())
        }
    }

    fn project() -> TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("main")).unwrap();
        fs::write(dir.path().join("main/index.js"), "// main").unwrap();
        fs::write(dir.path().join("main/preload.js"), "// preload").unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name":"demo","main":"main/index.js","version":"0.1.0"}"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_stage_order() {
        let names: Vec<_> = Stage::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            [
                "clean",
                "frontend",
                "base-path",
                "runtime-files",
                "manifest",
                "dependency-stub",
                "package"
            ]
        );
    }

    #[tokio::test]
    async fn test_full_build() {
        let dir = project();
        let root = dir.path();
        let pipeline = BuildPipeline::new(
            BuildConfig::new(root),
            FakeBundler::default(),
            FakePackager::default(),
        );

        let report = pipeline.run().await.unwrap();
        assert_eq!(report.runtime_files, 2);
        assert_eq!(report.rewrite.files_rewritten, 1);
        assert_eq!(report.rewrite.replacements, 1);

        let staging = root.join("dist/bundled");
        assert_eq!(
            pipeline.bundler.calls.lock().unwrap()[0],
            ("app://./".to_string(), staging.clone())
        );

        assert_eq!(
            fs::read_to_string(staging.join("index.html")).unwrap(),
            "<script type=\"module\" src=\"app://./assets/index.js\"></script>"
        );
        assert_eq!(
            fs::read_to_string(staging.join("assets/index.js")).unwrap(),
            "import('app://./assets/chunk.js')"
        );
        assert_eq!(fs::read_to_string(staging.join("index.js")).unwrap(), "// main");
        assert_eq!(
            fs::read_to_string(staging.join("preload.js")).unwrap(),
            "// preload"
        );

        let manifest: Value =
            serde_json::from_str(&fs::read_to_string(staging.join("package.json")).unwrap())
                .unwrap();
        assert_eq!(manifest["main"], "index.js");
        assert_eq!(manifest["version"], "0.1.0");

        let stub = staging.join("node_modules");
        assert!(stub.is_dir());
        assert_eq!(fs::read_dir(&stub).unwrap().count(), 0);

        let targets = pipeline.packager.targets.lock().unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0], PackageTarget::new(staging, root.join("dist")));
        assert!(root.join("dist/app.AppImage").is_file());

        // Project manifest untouched
        let original: Value =
            serde_json::from_str(&fs::read_to_string(root.join("package.json")).unwrap()).unwrap();
        assert_eq!(original["main"], "main/index.js");
    }

    #[tokio::test]
    async fn test_stale_output_removed() {
        let dir = project();
        fs::create_dir_all(dir.path().join("dist/bundled/old")).unwrap();
        fs::write(dir.path().join("dist/stale.txt"), "old").unwrap();
        fs::write(dir.path().join("dist/bundled/old/x.js"), "old").unwrap();

        let pipeline = BuildPipeline::new(
            BuildConfig::new(dir.path()),
            FakeBundler::default(),
            FakePackager::default(),
        );
        pipeline.run().await.unwrap();

        assert!(!dir.path().join("dist/stale.txt").exists());
        assert!(!dir.path().join("dist/bundled/old").exists());
    }

    #[tokio::test]
    async fn test_bundler_failure_stops_build() {
        let dir = project();
        let bundler = FakeBundler {
            fail: true,
            ..Default::default()
        };
        let pipeline =
            BuildPipeline::new(BuildConfig::new(dir.path()), bundler, FakePackager::default());

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(
            err,
            BuildError::Stage {
                stage: Stage::Frontend,
                ..
            }
        ));
        assert!(pipeline.packager.targets.lock().unwrap().is_empty());
        assert!(!dir.path().join("dist/bundled/index.js").exists());
    }

    #[tokio::test]
    async fn test_missing_runtime_file() {
        let dir = project();
        fs::remove_file(dir.path().join("main/preload.js")).unwrap();

        let pipeline = BuildPipeline::new(
            BuildConfig::new(dir.path()),
            FakeBundler::default(),
            FakePackager::default(),
        );

        match pipeline.run().await.unwrap_err() {
            BuildError::Stage { stage, source } => {
                assert_eq!(stage, Stage::RuntimeFiles);
                assert!(matches!(*source, BuildError::MissingRuntimeFile(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(pipeline.packager.targets.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_manifest_fails_stage() {
        let dir = project();
        fs::write(dir.path().join("package.json"), "not json").unwrap();

        let pipeline = BuildPipeline::new(
            BuildConfig::new(dir.path()),
            FakeBundler::default(),
            FakePackager::default(),
        );

        match pipeline.run().await.unwrap_err() {
            BuildError::Stage { stage, source } => {
                assert_eq!(stage, Stage::Manifest);
                assert!(matches!(*source, BuildError::Manifest { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("dist/bundled/node_modules").exists());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let dir = project();
        let pipeline = BuildPipeline::new(
            BuildConfig::new(dir.path()).with_base(""),
            FakeBundler::default(),
            FakePackager::default(),
        );

        assert!(matches!(pipeline.run().await, Err(BuildError::Config(_))));
        assert!(pipeline.bundler.calls.lock().unwrap().is_empty());
    }
}
