//! Ctrl-C handling for capture runs
//!
//! The first Ctrl-C while recording stops the capture and lets the recording
//! be processed. Any Ctrl-C after that aborts the run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::application::StopHandle;

/// What an interrupt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// Recording was asked to stop
    StopCapture,
    /// The run was asked to give up
    Abort,
}

/// Routes Ctrl-C to either a capture stop or an abort
#[derive(Clone)]
pub struct ShutdownSignal {
    recording: Arc<AtomicBool>,
    abort_tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Create a handler for a run that is about to start recording
    pub fn new() -> Self {
        let (abort_tx, _) = watch::channel(false);
        Self {
            recording: Arc::new(AtomicBool::new(true)),
            abort_tx: Arc::new(abort_tx),
        }
    }

    /// Mark recording as over; the next interrupt aborts.
    pub fn end_recording(&self) {
        self.recording.store(false, Ordering::SeqCst);
    }

    /// React to one interrupt.
    pub fn interrupt(&self, stop: &StopHandle) -> Interrupt {
        if self.recording.swap(false, Ordering::SeqCst) {
            tracing::info!("interrupt received, stopping capture");
            stop.request_stop();
            Interrupt::StopCapture
        } else {
            tracing::warn!("interrupt received, aborting");
            self.abort_tx.send_replace(true);
            Interrupt::Abort
        }
    }

    /// Resolves once the run has been aborted
    pub async fn aborted(&self) {
        let mut rx = self.abort_tx.subscribe();
        let _ = rx.wait_for(|aborted| *aborted).await;
    }

    /// Listen for Ctrl-C for the rest of the process.
    pub fn setup(&self, stop: StopHandle) {
        let signal = self.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "failed to listen for Ctrl-C");
                    return;
                }
                signal.interrupt(&stop);
            }
        });
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
