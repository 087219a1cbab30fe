//! File-backed protocol handler for the custom scheme

use crate::error::{AssetError, AssetResult};
use crate::mime::mime_type_for;
use crate::scheme::{ProtocolHandler, ProtocolRequest, ProtocolResponse};
use appshell_core::ShellConfig;
use futures::future::BoxFuture;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

/// Outcome of serving one request
#[derive(Debug)]
pub enum AssetResponse {
    /// File read successfully
    Found {
        mime_type: &'static str,
        data: Vec<u8>,
    },
    /// No file at the resolved path
    NotFound { path: PathBuf },
    /// The file exists but could not be read
    ReadError { path: PathBuf, source: io::Error },
    /// The URL could not be mapped onto the asset root
    Rejected(AssetError),
}

impl AssetResponse {
    /// Status code the host should report
    pub fn status(&self) -> u16 {
        match self {
            AssetResponse::Found { .. } => 200,
            AssetResponse::NotFound { .. } => 404,
            AssetResponse::ReadError { .. } => 500,
            AssetResponse::Rejected(_) => 400,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, AssetResponse::Found { .. })
    }
}

impl From<AssetResponse> for ProtocolResponse {
    fn from(response: AssetResponse) -> Self {
        let status = response.status();
        match response {
            AssetResponse::Found { mime_type, data } => ProtocolResponse {
                status,
                mime_type: mime_type.to_string(),
                data,
            },
            _ => ProtocolResponse {
                status,
                mime_type: String::new(),
                data: Vec::new(),
            },
        }
    }
}

/// Serves files under a fixed root for one custom scheme
#[derive(Debug, Clone)]
pub struct AssetServer {
    root: PathBuf,
    scheme: String,
}

impl AssetServer {
    pub fn new(root: impl Into<PathBuf>, scheme: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            scheme: scheme.into(),
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(config.asset_root(), config.scheme.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Map a request URL onto a path under the asset root.
    ///
    /// The URL path is percent-decoded and joined component by component;
    /// parent-directory components are rejected.
    pub fn resolve(&self, url: &str) -> AssetResult<PathBuf> {
        let parsed = Url::parse(url).map_err(|e| AssetError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != self.scheme {
            return Err(AssetError::SchemeMismatch {
                expected: self.scheme.clone(),
                found: parsed.scheme().to_string(),
            });
        }

        let decoded = percent_decode_str(parsed.path())
            .decode_utf8()
            .map_err(|_| AssetError::InvalidEncoding(parsed.path().to_string()))?;

        let mut path = self.root.clone();
        for component in Path::new(decoded.as_ref()).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(AssetError::OutsideRoot(decoded.to_string()));
                }
            }
        }

        Ok(path)
    }

    /// Resolve and read the file behind `url`
    pub async fn serve(&self, url: &str) -> AssetResponse {
        let path = match self.resolve(url) {
            Ok(path) => path,
            Err(e) => {
                warn!("Rejected asset request {}: {}", url, e);
                return AssetResponse::Rejected(e);
            }
        };

        match tokio::fs::read(&path).await {
            Ok(data) => {
                debug!("Serving asset: {} ({} bytes)", path.display(), data.len());
                AssetResponse::Found {
                    mime_type: mime_type_for(&path),
                    data,
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Asset not found: {}", path.display());
                AssetResponse::NotFound { path }
            }
            Err(source) => {
                warn!("Failed to read asset {}: {}", path.display(), source);
                AssetResponse::ReadError { path, source }
            }
        }
    }
}

impl ProtocolHandler for AssetServer {
    fn handle(&self, request: ProtocolRequest) -> BoxFuture<'_, ProtocolResponse> {
        Box::pin(async move { self.serve(&request.url).await.into() })
    }
}
