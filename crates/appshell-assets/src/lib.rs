//! appshell Assets - Custom-scheme file serving
//!
//! Resolves `app://./<path>` requests to files under the packaged asset root
//! and keeps track of which schemes the host runtime has been told about.
//!
//! # Registration order
//!
//! 1. Declare the scheme privileged (secure, standard) before the host is ready
//! 2. Once ready, register a buffer protocol handler for it
//! 3. The host dispatches every request for the scheme to that handler

mod error;
pub mod mime;
pub mod scheme;
pub mod server;

pub use error::{AssetError, AssetResult, SchemeError, SchemeResult};
pub use mime::mime_type_for;
pub use scheme::{
    PrivilegedScheme, ProtocolHandler, ProtocolRequest, ProtocolResponse, SchemePrivileges,
    SchemeRegistry,
};
pub use server::{AssetResponse, AssetServer};
