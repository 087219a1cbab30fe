//! Main Process Controller
//!
//! Owns the counter store and the IPC router, prepares the host runtime and
//! answers renderer invocations coming over the bridge.

use crate::bridge::MainBridge;
use crate::error::{ShellError, ShellResult};
use crate::host::HostRuntime;
use crate::ipc::{IncrHandler, IpcRouter};
use crate::window::WindowSpec;
use appshell_assets::{AssetServer, PrivilegedScheme, SchemePrivileges};
use appshell_core::protocol::IpcReply;
use appshell_core::{Mode, ShellConfig};
use appshell_store::CounterStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Main process state, created at process start and torn down by
/// [`MainProcess::shutdown`]
pub struct MainProcess {
    config: ShellConfig,
    mode: Mode,
    store: Arc<CounterStore>,
    router: IpcRouter,
}

impl MainProcess {
    /// Create a main process with a fresh in-memory counter
    pub fn new(config: ShellConfig, mode: Mode) -> ShellResult<Self> {
        let store = CounterStore::open_in_memory()?;
        Ok(Self::with_store(config, mode, store))
    }

    /// Create a main process whose mode comes from the `MODE` variable
    pub fn from_env(config: ShellConfig) -> ShellResult<Self> {
        Self::new(config, Mode::from_env())
    }

    pub fn with_store(config: ShellConfig, mode: Mode, store: CounterStore) -> Self {
        let store = Arc::new(store);
        let mut router = IpcRouter::new();
        router.handle(IncrHandler::channel(), Arc::new(IncrHandler::new(store.clone())));

        Self {
            config,
            mode,
            store,
            router,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn store(&self) -> &CounterStore {
        &self.store
    }

    pub fn router(&self) -> &IpcRouter {
        &self.router
    }

    /// Run the whole startup sequence: declare schemes, wait for the host,
    /// then create the window
    pub fn launch<H: HostRuntime>(&self, host: &mut H) -> ShellResult<()> {
        self.before_ready(host)?;
        host.ready()?;
        self.on_ready(host)
    }

    /// Declare the custom scheme privileged. Skipped in development, where
    /// the dev server is loaded instead.
    pub fn before_ready<H: HostRuntime>(&self, host: &mut H) -> ShellResult<()> {
        if self.mode.is_development() {
            debug!("Development mode: skipping scheme privileges");
            return Ok(());
        }

        host.schemes().register_schemes_as_privileged(&[PrivilegedScheme::new(
            self.config.scheme.clone(),
            SchemePrivileges::secure_standard(),
        )])?;
        Ok(())
    }

    /// Attach the asset server (production only) and open the window
    pub fn on_ready<H: HostRuntime>(&self, host: &mut H) -> ShellResult<()> {
        let spec = WindowSpec::for_mode(&self.config, self.mode);

        if !self.mode.is_development() {
            let server = AssetServer::from_config(&self.config);
            info!(
                "Serving {}:// from {}",
                server.scheme(),
                server.root().display()
            );
            host.schemes()
                .register_buffer_protocol(&self.config.scheme, Arc::new(server))?;
        }

        info!(
            "Creating {}x{} window ({} mode) at {}",
            spec.width,
            spec.height,
            self.mode,
            spec.url()
        );
        host.create_window(spec)
    }

    /// Answer invocations until every renderer end of the bridge is dropped
    pub async fn serve_ipc(&self, mut bridge: MainBridge) {
        info!("IPC bridge started");

        while let Some(request) = bridge.request_rx.recv().await {
            let channel = request.invoke.channel;
            let result = self.router.invoke(&channel, request.invoke.payload);
            if let Err(ref e) = result {
                warn!("IPC {} failed: {}", channel, e);
            }

            if request.reply.send(IpcReply::from_result(result)).is_err() {
                warn!("Renderer dropped reply for channel {}", channel);
            }
        }

        info!("IPC bridge stopped");
    }

    /// Tear down the process state, closing the counter store
    pub fn shutdown(self) -> ShellResult<()> {
        drop(self.router);
        let store = Arc::try_unwrap(self.store).map_err(|_| ShellError::StoreInUse)?;
        store.close()?;
        info!("Main process shut down");
        Ok(())
    }
}
