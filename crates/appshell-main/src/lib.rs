//! appshell Main - Main process of the desktop shell
//!
//! Wires the asset server, the counter store and the IPC bridge to a host
//! GUI runtime. The runtime itself sits behind [`HostRuntime`].

mod error;
pub mod bridge;
pub mod controller;
pub mod host;
pub mod ipc;
pub mod window;

pub use bridge::{create_bridge, BridgeApi, IpcRequest, MainBridge, RendererBridge};
pub use controller::MainProcess;
pub use error::{ShellError, ShellResult};
pub use host::HostRuntime;
pub use ipc::{to_number, IncrHandler, IpcHandler, IpcRouter};
pub use window::{LoadTarget, WindowSpec};
