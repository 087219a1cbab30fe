//! appshell Build
//!
//! Produces a self-contained, packaged desktop app from a frontend project:
//!
//! - **Pipeline**: clean, bundle under the custom base URL, repair the base
//!   prefix in the emitted files, stage runtime files and the manifest, then
//!   hand the staging directory to the packager.
//!
//! - **Dev serve**: runs the frontend dev server next to the desktop runtime
//!   in development mode.

mod error;
pub mod manifest;
pub mod pipeline;
pub mod rewrite;
pub mod serve;
pub mod tools;

pub use error::{BuildError, BuildResult};
pub use pipeline::{BuildPipeline, BuildReport, Stage};
pub use rewrite::{walk_files, BasePathFixer, RewriteReport};
pub use serve::DevSession;
pub use tools::{Bundler, CommandBundler, CommandPackager, PackageTarget, Packager};
