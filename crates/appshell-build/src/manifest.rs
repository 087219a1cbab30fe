//! Staged package manifest

use crate::error::{BuildError, BuildResult};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Copy the project manifest from `source` to `dest` with `main` pointing at
/// `entry`. Every other field keeps its value and position; `source` is only
/// read.
pub fn stage_manifest(source: &Path, dest: &Path, entry: &str) -> BuildResult<()> {
    let content = fs::read_to_string(source).map_err(BuildError::io(source))?;

    let mut manifest: Map<String, Value> =
        serde_json::from_str(&content).map_err(|e| BuildError::Manifest {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?;

    let previous = manifest.insert("main".to_string(), Value::String(entry.to_string()));
    debug!("Manifest main: {:?} -> {}", previous, entry);

    let output = serde_json::to_string_pretty(&manifest).map_err(|e| BuildError::Manifest {
        path: dest.to_path_buf(),
        message: e.to_string(),
    })?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
    }
    fs::write(dest, output).map_err(BuildError::io(dest))?;
    Ok(())
}
