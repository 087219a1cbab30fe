//! appshell - build and development tooling for a webview desktop app
//!
//! `appshell build` produces the packaged app under `dist/`;
//! `appshell serve` runs the dev server next to the desktop runtime.

use anyhow::Result;
use appshell_build::{BuildPipeline, DevSession};
use appshell_core::{BuildConfig, ServeConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// appshell - package and develop the desktop app
#[derive(Parser, Debug)]
#[command(name = "appshell")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bundle, stage and package the app into dist/
    Build {
        #[command(flatten)]
        common: CommonArgs,

        /// Base URL the frontend assets are served under
        #[arg(long, default_value = appshell_core::config::DEFAULT_BASE)]
        base: String,
    },

    /// Run the dev server and the desktop runtime in development mode
    Serve {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Project directory containing package.json
    #[arg(short = 'C', long, default_value = ".")]
    project_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build { common, base } => {
            init_logging(common.verbose);
            info!("appshell v{}", env!("CARGO_PKG_VERSION"));

            let config = BuildConfig::new(common.project_dir).with_base(base);
            let report = BuildPipeline::from_config(config).run().await?;
            info!(
                "Rewrote {} of {} bundled files",
                report.rewrite.files_rewritten, report.rewrite.files_scanned
            );
        }
        Command::Serve { common } => {
            init_logging(common.verbose);
            info!("appshell v{}", env!("CARGO_PKG_VERSION"));

            DevSession::new(ServeConfig::new(common.project_dir))
                .run()
                .await?;
        }
    }

    Ok(())
}
