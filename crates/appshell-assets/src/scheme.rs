//! Custom scheme registration and request dispatch
//!
//! Mirrors the rules a Chromium-based host applies to custom schemes:
//! privileges are fixed before the host is ready, and a buffer protocol can
//! only be attached to a scheme that was declared standard.

use crate::error::{SchemeError, SchemeResult};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Privileges granted to a custom scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemePrivileges {
    /// Parsed like `http`: relative URLs, origins, path normalisation
    pub standard: bool,
    /// Treated as a secure context
    pub secure: bool,
    pub bypass_csp: bool,
    pub support_fetch_api: bool,
    pub cors_enabled: bool,
}

impl SchemePrivileges {
    /// The privilege set the packaged frontend needs
    pub fn secure_standard() -> Self {
        Self {
            standard: true,
            secure: true,
            ..Default::default()
        }
    }
}

/// A scheme together with the privileges it is declared with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegedScheme {
    pub scheme: String,
    pub privileges: SchemePrivileges,
}

impl PrivilegedScheme {
    pub fn new(scheme: impl Into<String>, privileges: SchemePrivileges) -> Self {
        Self {
            scheme: scheme.into(),
            privileges,
        }
    }
}

/// A request intercepted by the host for a registered scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolRequest {
    pub url: String,
}

impl ProtocolRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Buffer response handed back to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolResponse {
    pub status: u16,
    /// May be empty when the type is unknown
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ProtocolResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Answers requests for one custom scheme
pub trait ProtocolHandler: Send + Sync {
    fn handle(&self, request: ProtocolRequest) -> BoxFuture<'_, ProtocolResponse>;
}

/// Host-side bookkeeping of custom schemes
#[derive(Default)]
pub struct SchemeRegistry {
    privileged: HashMap<String, SchemePrivileges>,
    handlers: HashMap<String, Arc<dyn ProtocolHandler>>,
    ready: bool,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare schemes privileged. Only allowed before the host is ready.
    pub fn register_schemes_as_privileged(
        &mut self,
        schemes: &[PrivilegedScheme],
    ) -> SchemeResult<()> {
        if self.ready {
            let names: Vec<&str> = schemes.iter().map(|s| s.scheme.as_str()).collect();
            return Err(SchemeError::AfterReady(names.join(", ")));
        }

        for scheme in schemes {
            info!("Declaring scheme '{}' privileged: {:?}", scheme.scheme, scheme.privileges);
            self.privileged
                .insert(scheme.scheme.clone(), scheme.privileges);
        }
        Ok(())
    }

    /// Mark the host ready; privileges are frozen from here on
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn privileges(&self, scheme: &str) -> Option<SchemePrivileges> {
        self.privileged.get(scheme).copied()
    }

    /// Attach a buffer protocol handler to a privileged standard scheme
    pub fn register_buffer_protocol(
        &mut self,
        scheme: &str,
        handler: Arc<dyn ProtocolHandler>,
    ) -> SchemeResult<()> {
        if !self.ready {
            return Err(SchemeError::NotReady(scheme.to_string()));
        }
        match self.privileged.get(scheme) {
            Some(privileges) if privileges.standard => {}
            _ => return Err(SchemeError::NotPrivileged(scheme.to_string())),
        }
        if self.handlers.contains_key(scheme) {
            return Err(SchemeError::AlreadyRegistered(scheme.to_string()));
        }

        self.handlers.insert(scheme.to_string(), handler);
        info!("Registered buffer protocol for scheme '{}'", scheme);
        Ok(())
    }

    pub fn is_registered(&self, scheme: &str) -> bool {
        self.handlers.contains_key(scheme)
    }

    /// Route a request to the handler registered for its scheme
    pub async fn dispatch(&self, request: ProtocolRequest) -> SchemeResult<ProtocolResponse> {
        let scheme = Url::parse(&request.url)
            .map_err(|e| SchemeError::InvalidUrl(format!("{}: {}", request.url, e)))?
            .scheme()
            .to_string();

        let handler = self
            .handlers
            .get(&scheme)
            .ok_or_else(|| SchemeError::Unhandled(scheme.clone()))?;

        debug!("Dispatching {} to '{}' handler", request.url, scheme);
        Ok(handler.handle(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl ProtocolHandler for Echo {
        fn handle(&self, request: ProtocolRequest) -> BoxFuture<'_, ProtocolResponse> {
            Box::pin(async move {
                ProtocolResponse {
                    status: 200,
                    mime_type: "text/plain".to_string(),
                    data: request.url.into_bytes(),
                }
            })
        }
    }

    fn app_scheme() -> PrivilegedScheme {
        PrivilegedScheme::new("app", SchemePrivileges::secure_standard())
    }

    #[tokio::test]
    async fn test_registration_flow() {
        let mut registry = SchemeRegistry::new();
        registry.register_schemes_as_privileged(&[app_scheme()]).unwrap();
        registry.mark_ready();
        registry
            .register_buffer_protocol("app", Arc::new(Echo))
            .unwrap();
        assert!(registry.is_registered("app"));

        let response = registry
            .dispatch(ProtocolRequest::new("app://./index.html"))
            .await
            .unwrap();
        assert!(response.is_success());
        assert_eq!(response.data, b"app://./index.html");
    }

    #[test]
    fn test_privileges_frozen_after_ready() {
        let mut registry = SchemeRegistry::new();
        registry.mark_ready();
        let result = registry.register_schemes_as_privileged(&[app_scheme()]);
        assert!(matches!(result, Err(SchemeError::AfterReady(_))));
        assert!(registry.privileges("app").is_none());
    }

    #[test]
    fn test_protocol_requires_privileged_scheme() {
        let mut registry = SchemeRegistry::new();
        registry.mark_ready();
        let result = registry.register_buffer_protocol("app", Arc::new(Echo));
        assert!(matches!(result, Err(SchemeError::NotPrivileged(_))));

        let mut registry = SchemeRegistry::new();
        registry
            .register_schemes_as_privileged(&[PrivilegedScheme::new(
                "app",
                SchemePrivileges {
                    secure: true,
                    ..Default::default()
                },
            )])
            .unwrap();
        registry.mark_ready();
        let result = registry.register_buffer_protocol("app", Arc::new(Echo));
        assert!(matches!(result, Err(SchemeError::NotPrivileged(_))));
    }

    #[test]
    fn test_protocol_requires_ready_and_is_unique() {
        let mut registry = SchemeRegistry::new();
        registry.register_schemes_as_privileged(&[app_scheme()]).unwrap();
        let early = registry.register_buffer_protocol("app", Arc::new(Echo));
        assert!(matches!(early, Err(SchemeError::NotReady(_))));

        registry.mark_ready();
        registry.register_buffer_protocol("app", Arc::new(Echo)).unwrap();
        let again = registry.register_buffer_protocol("app", Arc::new(Echo));
        assert!(matches!(again, Err(SchemeError::AlreadyRegistered(_))));
    }

    #[tokio::test]
    async fn test_dispatch_unhandled_scheme() {
        let registry = SchemeRegistry::new();
        let result = registry
            .dispatch(ProtocolRequest::new("other://./index.html"))
            .await;
        assert!(matches!(result, Err(SchemeError::Unhandled(s)) if s == "other"));

        let result = registry.dispatch(ProtocolRequest::new("not a url")).await;
        assert!(matches!(result, Err(SchemeError::InvalidUrl(_))));
    }
}
