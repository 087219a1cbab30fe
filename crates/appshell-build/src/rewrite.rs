//! Base-path correction
//!
//! The bundler emits references such as `/app://./assets/x.js`: the base URL
//! with a stray leading slash. Every emitted file is scanned and each
//! `/` + base occurrence is replaced with the base itself.

use crate::error::{BuildError, BuildResult};
use jwalk::WalkDir;
use regex::bytes::{NoExpand, Regex};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Lazily walk every regular file under `root`, hidden files included, in a
/// stable order
pub fn walk_files(root: &Path) -> impl Iterator<Item = BuildResult<PathBuf>> {
    let root_path = root.to_path_buf();
    WalkDir::new(root)
        .skip_hidden(false)
        .sort(true)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(e) if e.file_type().is_file() => Some(Ok(e.path())),
            Ok(_) => None,
            Err(e) => Some(Err(BuildError::Walk {
                path: root_path.clone(),
                message: e.to_string(),
            })),
        })
}

/// Counters from one pass over a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub files_scanned: usize,
    pub files_rewritten: usize,
    pub replacements: usize,
}

/// Replaces `/<base>` with `<base>` in file contents
#[derive(Debug, Clone)]
pub struct BasePathFixer {
    base: String,
    pattern: Regex,
}

impl BasePathFixer {
    pub fn new(base: impl Into<String>) -> BuildResult<Self> {
        let base = base.into();
        let pattern = Regex::new(&regex::escape(&format!("/{}", base)))?;
        Ok(Self { base, pattern })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Fix a buffer, returning the result and the number of replacements.
    /// Content is treated as raw bytes so non-text files pass through intact.
    pub fn fix_bytes<'a>(&self, input: &'a [u8]) -> (Cow<'a, [u8]>, usize) {
        let count = self.pattern.find_iter(input).count();
        if count == 0 {
            return (Cow::Borrowed(input), 0);
        }
        let fixed = self
            .pattern
            .replace_all(input, NoExpand(self.base.as_bytes()));
        (fixed, count)
    }

    /// Fix one file in place. Unchanged files are not rewritten.
    pub fn fix_file(&self, path: &Path) -> BuildResult<usize> {
        let content = fs::read(path).map_err(BuildError::io(path))?;
        let (fixed, count) = self.fix_bytes(&content);
        if count > 0 {
            fs::write(path, fixed.as_ref()).map_err(BuildError::io(path))?;
            debug!("Fixed {} base reference(s) in {}", count, path.display());
        }
        Ok(count)
    }

    /// Fix every file under `root`
    pub fn fix_tree(&self, root: &Path) -> BuildResult<RewriteReport> {
        let mut report = RewriteReport::default();
        for path in walk_files(root) {
            let path = path?;
            report.files_scanned += 1;
            let count = self.fix_file(&path)?;
            if count > 0 {
                report.files_rewritten += 1;
                report.replacements += count;
            }
        }
        Ok(report)
    }
}
