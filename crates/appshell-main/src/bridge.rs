//! Renderer/main process communication bridge
//!
//! The renderer side sends invocations over an mpsc channel, each carrying a
//! one-shot slot for the reply. The main side answers them in order.

use crate::error::{ShellError, ShellResult};
use appshell_core::protocol::{number_from_value, IpcInvoke, IpcReply, INCR_CHANNEL};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

/// An invocation waiting for its reply
#[derive(Debug)]
pub struct IpcRequest {
    pub invoke: IpcInvoke,
    pub reply: oneshot::Sender<IpcReply>,
}

/// Renderer end of the bridge
#[derive(Clone)]
pub struct RendererBridge {
    request_tx: mpsc::Sender<IpcRequest>,
}

impl RendererBridge {
    /// Invoke a channel and wait for the main process to answer
    pub async fn invoke(
        &self,
        channel: &str,
        payload: impl Into<Option<Value>>,
    ) -> ShellResult<Value> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = IpcRequest {
            invoke: IpcInvoke::new(channel, payload),
            reply: reply_tx,
        };

        self.request_tx
            .send(request)
            .await
            .map_err(|_| ShellError::BridgeClosed)?;

        let reply = reply_rx.await.map_err(|_| ShellError::BridgeClosed)?;
        Ok(reply.into_result()?)
    }
}

/// Main process end of the bridge
pub struct MainBridge {
    /// Channel to receive invocations from the renderer
    pub request_rx: mpsc::Receiver<IpcRequest>,
}

/// Create a new bridge pair for renderer and main process
pub fn create_bridge() -> (RendererBridge, MainBridge) {
    let (request_tx, request_rx) = mpsc::channel::<IpcRequest>(32);
    (RendererBridge { request_tx }, MainBridge { request_rx })
}

/// The whitelisted surface exposed to the frontend
#[derive(Clone)]
pub struct BridgeApi {
    bridge: RendererBridge,
}

impl BridgeApi {
    pub fn new(bridge: RendererBridge) -> Self {
        Self { bridge }
    }

    /// `api.incr(value)`: the argument plus two, also stored as the counter
    pub async fn incr(&self, value: impl Into<Value>) -> ShellResult<f64> {
        let reply = self.bridge.invoke(INCR_CHANNEL, Some(value.into())).await?;
        number_from_value(&reply).ok_or_else(|| ShellError::UnexpectedReply {
            channel: INCR_CHANNEL.to_string(),
            reply: reply.to_string(),
        })
    }
}
