//! Window description handed to the host runtime

use appshell_core::{Mode, ShellConfig};
use std::path::PathBuf;

/// What the window loads first
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    /// Frontend dev server (development mode)
    DevServer(String),
    /// Entry page over the custom scheme
    Scheme(String),
}

impl LoadTarget {
    pub fn url(&self) -> &str {
        match self {
            LoadTarget::DevServer(url) | LoadTarget::Scheme(url) => url,
        }
    }
}

/// Window options plus the initial URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub width: u32,
    pub height: u32,
    /// Bridge script run in the renderer before the page
    pub preload: PathBuf,
    pub target: LoadTarget,
}

impl WindowSpec {
    pub fn for_mode(config: &ShellConfig, mode: Mode) -> Self {
        let target = if mode.is_development() {
            LoadTarget::DevServer(config.dev_server_url.clone())
        } else {
            LoadTarget::Scheme(config.entry_url())
        };

        Self {
            width: config.width,
            height: config.height,
            preload: config.preload_path(),
            target,
        }
    }

    pub fn url(&self) -> &str {
        self.target.url()
    }
}
