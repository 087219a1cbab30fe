//! Seam to the GUI host runtime

use crate::error::ShellResult;
use crate::window::WindowSpec;
use appshell_assets::SchemeRegistry;

/// The GUI runtime hosting the renderer.
///
/// Implementations own the window system and the network stack; the main
/// process only declares schemes, attaches protocol handlers and asks for
/// windows.
pub trait HostRuntime {
    /// The host's custom scheme bookkeeping
    fn schemes(&mut self) -> &mut SchemeRegistry;

    /// Finish startup. Scheme privileges are frozen afterwards.
    fn ready(&mut self) -> ShellResult<()>;

    /// Open a window and start loading its target URL
    fn create_window(&mut self, spec: WindowSpec) -> ShellResult<()>;
}
