//! Development session
//!
//! Runs the frontend dev server and the desktop runtime side by side with
//! `MODE=development`. The session ends when either child exits or on Ctrl+C;
//! whatever is still running is killed.

use crate::error::{BuildError, BuildResult};
use crate::tools::resolve_program;
use appshell_core::config::MODE_ENV;
use appshell_core::{Mode, ServeConfig, ToolCommand};
use std::future::Future;
use std::io;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};
use tracing::{info, warn};

pub struct DevSession {
    config: ServeConfig,
}

impl DevSession {
    pub fn new(config: ServeConfig) -> Self {
        Self { config }
    }

    /// Run until a child exits or Ctrl+C is pressed
    pub async fn run(&self) -> BuildResult<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until a child exits or `shutdown` completes
    pub async fn run_until<F>(&self, shutdown: F) -> BuildResult<()>
    where
        F: Future<Output = ()>,
    {
        let mut dev_server = self.spawn(&self.config.dev_server)?;
        let mut app = match self.spawn(&self.config.app_runtime) {
            Ok(child) => child,
            Err(e) => {
                stop(&mut dev_server).await;
                return Err(e);
            }
        };

        tokio::select! {
            status = dev_server.wait() => {
                stop(&mut app).await;
                check_exit(&self.config.dev_server, status)
            }
            status = app.wait() => {
                stop(&mut dev_server).await;
                check_exit(&self.config.app_runtime, status)
            }
            _ = shutdown => {
                info!("Stopping development session");
                stop(&mut app).await;
                stop(&mut dev_server).await;
                Ok(())
            }
        }
    }

    fn spawn(&self, command: &ToolCommand) -> BuildResult<Child> {
        let program = resolve_program(&command.program)?;
        info!("Starting: {}", command);

        Command::new(program)
            .args(&command.args)
            .current_dir(&self.config.project_dir)
            .env(MODE_ENV, Mode::Development.as_str())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BuildError::CommandSpawn {
                command: command.program.clone(),
                source,
            })
    }
}

async fn stop(child: &mut Child) {
    if let Err(e) = child.kill().await {
        // Already exited
        if e.kind() != io::ErrorKind::InvalidInput {
            warn!("Failed to stop child process: {}", e);
        }
    }
}

fn check_exit(command: &ToolCommand, status: io::Result<ExitStatus>) -> BuildResult<()> {
    let status = status.map_err(|source| BuildError::CommandSpawn {
        command: command.program.clone(),
        source,
    })?;

    if status.success() {
        info!("{} exited", command);
        Ok(())
    } else {
        Err(BuildError::CommandFailed {
            command: command.to_string(),
            status: status.to_string(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn sh(script: &str) -> ToolCommand {
        ToolCommand::new("sh").args(["-c", script])
    }

    fn session(dir: &std::path::Path, dev_server: &str, app: &str) -> DevSession {
        let mut config = ServeConfig::new(dir);
        config.dev_server = sh(dev_server);
        config.app_runtime = sh(app);
        DevSession::new(config)
    }

    fn never() -> impl Future<Output = ()> {
        std::future::pending()
    }

    #[tokio::test]
    async fn test_app_exit_ends_session() {
        let dir = tempdir().unwrap();
        let session = session(dir.path(), "sleep 30", "exit 0");
        session.run_until(never()).await.unwrap();
    }

    #[tokio::test]
    async fn test_children_see_development_mode() {
        let dir = tempdir().unwrap();
        let session = session(
            dir.path(),
            "sleep 30",
            r#"test "$MODE" = development && pwd > cwd.txt"#,
        );
        session.run_until(never()).await.unwrap();

        let cwd = std::fs::read_to_string(dir.path().join("cwd.txt")).unwrap();
        assert_eq!(
            std::fs::canonicalize(cwd.trim()).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_failed_child_is_error() {
        let dir = tempdir().unwrap();
        let session = session(dir.path(), "exit 4", "sleep 30");
        let result = session.run_until(never()).await;
        assert!(matches!(result, Err(BuildError::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn test_shutdown_stops_children() {
        let dir = tempdir().unwrap();
        let session = session(dir.path(), "sleep 30", "sleep 30");
        let shutdown = tokio::time::sleep(Duration::from_millis(100));

        let result = tokio::time::timeout(Duration::from_secs(10), session.run_until(shutdown))
            .await
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_missing_program() {
        let dir = tempdir().unwrap();
        let mut config = ServeConfig::new(dir.path());
        config.dev_server = ToolCommand::new("appshell-no-such-dev-server-7f3a");
        let result = DevSession::new(config).run_until(never()).await;
        assert!(matches!(result, Err(BuildError::ToolNotFound(_))));
    }
}
