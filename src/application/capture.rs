//! Capture use case
//!
//! Acquires a stream, pumps its chunks into the recording controller until
//! the producer ends or a stop is requested, then runs the stop pipeline.

use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::audio::EncodedContainer;
use crate::domain::capture::{CaptureDuration, StreamHandle};

use super::ports::{AudioDecoder, CaptureRequest, StreamSource};
use super::recording::{RecordingController, RecordingError};

/// Input parameters for a capture
#[derive(Debug, Clone)]
pub struct CaptureInput {
    /// What to capture
    pub request: CaptureRequest,
    /// Stop automatically after this long
    pub limit: Option<CaptureDuration>,
}

/// Why recording stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The producer stopped delivering chunks
    StreamEnded,
    /// A stop was requested through a `StopHandle`
    Requested,
    /// The capture limit elapsed
    LimitReached,
}

/// Output from a successful capture
#[derive(Debug, Clone)]
pub struct CaptureOutput {
    pub container: EncodedContainer,
    pub chunk_count: usize,
    pub stop_reason: StopReason,
}

/// Callbacks for status updates
#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct CaptureCallbacks {
    /// Called once recording has started
    pub on_capture_start: Option<Box<dyn Fn(&StreamHandle) + Send + Sync>>,
    /// Called after each recorded chunk with (chunk count, total bytes)
    pub on_chunk: Option<Box<dyn Fn(usize, usize) + Send + Sync>>,
    /// Called when recording stops and processing begins
    pub on_processing_start: Option<Box<dyn Fn(StopReason) + Send + Sync>>,
}

/// Requests a stop of the capture it was taken from. Clonable, usable from
/// signal handlers and other tasks.
#[derive(Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub fn request_stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Capture use case
pub struct CaptureUseCase<S, D>
where
    S: StreamSource,
    D: AudioDecoder,
{
    source: S,
    controller: RecordingController<D>,
    stop_tx: Arc<watch::Sender<bool>>,
}

impl<S, D> CaptureUseCase<S, D>
where
    S: StreamSource,
    D: AudioDecoder,
{
    /// Create a new use case instance
    pub fn new(source: S, decoder: D) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            source,
            controller: RecordingController::new(decoder),
            stop_tx: Arc::new(stop_tx),
        }
    }

    /// The controller holding the session, for dispatch and reset
    pub fn controller(&self) -> &RecordingController<D> {
        &self.controller
    }

    /// Handle for stopping the capture from elsewhere
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: Arc::clone(&self.stop_tx),
        }
    }

    /// Run one capture from stream acquisition to a READY container.
    pub async fn execute(
        &self,
        input: CaptureInput,
        callbacks: CaptureCallbacks,
    ) -> Result<CaptureOutput, RecordingError> {
        self.stop_tx.send_replace(false);
        let mut stop_rx = self.stop_tx.subscribe();

        let stream = self.source.acquire(&input.request).await;
        let handle = stream.as_ref().map(|s| s.handle());
        self.controller.start(handle.clone()).await?;

        if let Some(cb) = &callbacks.on_capture_start {
            if let Some(handle) = &handle {
                cb(handle);
            }
        }

        let limit = input.limit;
        let deadline = async move {
            match limit {
                Some(limit) => tokio::time::sleep(limit.as_std()).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        let mut stop_reason = StopReason::StreamEnded;
        let mut chunk_count = 0usize;
        let mut total_bytes = 0usize;

        if let Some(mut stream) = stream {
            loop {
                tokio::select! {
                    biased;
                    _ = async { let _ = stop_rx.wait_for(|stop| *stop).await; } => {
                        stop_reason = StopReason::Requested;
                        break;
                    }
                    _ = &mut deadline => {
                        stop_reason = StopReason::LimitReached;
                        break;
                    }
                    chunk = stream.next_chunk() => match chunk {
                        Some(Ok(chunk)) => {
                            let len = chunk.len();
                            if self.controller.append_chunk(chunk).await {
                                chunk_count += 1;
                                total_bytes += len;
                                if let Some(cb) = &callbacks.on_chunk {
                                    cb(chunk_count, total_bytes);
                                }
                            }
                        }
                        Some(Err(e)) => return Err(self.controller.abort(e).await),
                        None => break,
                    },
                }
            }
        }

        tracing::debug!(reason = ?stop_reason, chunks = chunk_count, bytes = total_bytes, "recording loop finished");
        if let Some(cb) = &callbacks.on_processing_start {
            cb(stop_reason);
        }

        let container = self.controller.stop().await?;
        Ok(CaptureOutput {
            container,
            chunk_count,
            stop_reason,
        })
    }
}
