use crate::error::{RecorderError, Result};
use crate::events::WindowDescriptor;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

/// Commands sent to the capture backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum CaptureCommand {
    /// Start emitting `element-captured` events for `target`
    #[serde(rename_all = "camelCase")]
    BeginCapture {
        target: WindowDescriptor,
        workflow_name: String,
    },
    /// Stop emitting events
    EndCapture,
    /// Capture is suspended; events may still arrive and will be dropped
    Pause,
    Resume,
}

/// The external process that watches the target window.
///
/// `send` must not block: implementations queue the command for their
/// transport and return.
pub trait CaptureBackend: Send + Sync {
    fn is_connected(&self) -> bool;

    fn send(&self, command: CaptureCommand) -> Result<()>;
}

/// Backend over an in-process channel. The receiving half stands in for the
/// socket to the browser extension or desktop agent.
#[derive(Debug)]
pub struct ChannelBackend {
    tx: mpsc::UnboundedSender<CaptureCommand>,
    connected: AtomicBool,
}

impl ChannelBackend {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CaptureCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                connected: AtomicBool::new(true),
            },
            rx,
        )
    }

    /// Simulates the transport dropping
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn reconnect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }
}

impl CaptureBackend for ChannelBackend {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && !self.tx.is_closed()
    }

    fn send(&self, command: CaptureCommand) -> Result<()> {
        if !self.is_connected() {
            return Err(RecorderError::BackendUnavailable);
        }
        debug!("Sending capture command: {:?}", command);
        self.tx
            .send(command)
            .map_err(|_| RecorderError::BackendUnavailable)
    }
}
