//! Recording controller use case
//!
//! Hosts the single capture session and runs the stop pipeline:
//! assemble chunks, decode, encode, publish.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::audio::{wav, AudioMimeType, EncodedContainer};
use crate::domain::capture::{
    AudioChunk, CaptureSession, CaptureState, InvalidStateTransition, StartError, StreamHandle,
};

use super::ports::{AudioDecoder, DecodeError, StreamError};

/// Errors from the recording controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordingError {
    #[error("Could not capture audio: no stream available")]
    CaptureUnavailable,

    #[error("Capture interrupted: {0}")]
    Stream(#[from] StreamError),

    #[error("Decoding failed: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),
}

impl From<StartError> for RecordingError {
    fn from(err: StartError) -> Self {
        match err {
            StartError::CaptureUnavailable => Self::CaptureUnavailable,
            StartError::InvalidTransition(e) => Self::InvalidState(e),
        }
    }
}

/// Concatenate chunks in arrival order.
///
/// Chunks are fragments of one continuous container; reordering them
/// corrupts the stream.
pub fn assemble_chunks(chunks: Vec<AudioChunk>) -> Vec<u8> {
    let total = chunks.iter().map(AudioChunk::len).sum();
    let mut data = Vec::with_capacity(total);
    for chunk in chunks {
        data.extend_from_slice(chunk.as_bytes());
    }
    data
}

/// Owns the capture session and the decoder it hands recordings to.
///
/// The session lock is never held across the decode call. Reentrant
/// `start`/`stop` calls made while a decode is outstanding are turned away
/// by the session's STOPPING state instead.
pub struct RecordingController<D>
where
    D: AudioDecoder,
{
    decoder: D,
    session: Arc<Mutex<CaptureSession>>,
}

impl<D> RecordingController<D>
where
    D: AudioDecoder,
{
    /// Create a controller with an idle session
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            session: Arc::new(Mutex::new(CaptureSession::new())),
        }
    }

    /// Get current capture state
    pub async fn state(&self) -> CaptureState {
        self.session.lock().await.state()
    }

    /// The finished container, if the session is ready
    pub async fn container(&self) -> Option<EncodedContainer> {
        self.session.lock().await.container().cloned()
    }

    /// Why the last pipeline run failed, if the session is failed
    pub async fn failure(&self) -> Option<String> {
        self.session.lock().await.failure().map(str::to_string)
    }

    /// Number of chunks recorded so far
    pub async fn chunk_count(&self) -> usize {
        self.session.lock().await.chunk_count()
    }

    /// Begin recording `stream`; `None` means the stream could not be acquired.
    pub async fn start(&self, stream: Option<StreamHandle>) -> Result<(), RecordingError> {
        let mut session = self.session.lock().await;
        let label = stream.as_ref().map(|s| s.to_string());

        if let Err(e) = session.start(stream) {
            tracing::warn!(state = %session.state(), error = %e, "capture not started");
            return Err(e.into());
        }

        tracing::info!(stream = label.as_deref().unwrap_or(""), "capture started");
        Ok(())
    }

    /// Record one chunk. Returns `false` (and drops the chunk) unless recording.
    pub async fn append_chunk(&self, chunk: AudioChunk) -> bool {
        let mut session = self.session.lock().await;
        let len = chunk.len();
        let accepted = session.append_chunk(chunk);

        if accepted {
            tracing::trace!(bytes = len, total = session.chunk_count(), "chunk recorded");
        } else {
            tracing::debug!(bytes = len, state = %session.state(), "late chunk ignored");
        }
        accepted
    }

    /// Stop recording and convert the chunks into a WAV container.
    ///
    /// On success the session is READY and the container is also returned.
    /// A decode failure leaves the session FAILED; call `reset` before the
    /// next `start`.
    pub async fn stop(&self) -> Result<EncodedContainer, RecordingError> {
        let (chunks, mime_type) = {
            let mut session = self.session.lock().await;
            let mime_type = session.stream().map(|s| s.mime_type()).unwrap_or_default();
            (session.begin_stop()?, mime_type)
        };
        tracing::info!(chunks = chunks.len(), %mime_type, "capture stopped, processing");

        match self.process(chunks, mime_type).await {
            Ok(container) => {
                let mut session = self.session.lock().await;
                session.finish(container.clone())?;
                tracing::info!(
                    bytes = container.size_bytes(),
                    frames = container.frame_count(),
                    channels = container.channel_count(),
                    sample_rate = container.sample_rate(),
                    "recording ready"
                );
                Ok(container)
            }
            Err(e) => {
                self.session.lock().await.fail(e.to_string());
                tracing::error!(error = %e, "recording failed");
                Err(e.into())
            }
        }
    }

    /// Give up on the current recording because its stream broke.
    ///
    /// The session moves to FAILED and keeps nothing that was recorded.
    pub async fn abort(&self, error: StreamError) -> RecordingError {
        let mut session = self.session.lock().await;
        let chunks = session.chunk_count();
        session.fail(error.to_string());
        tracing::error!(error = %error, chunks, "capture aborted");
        error.into()
    }

    /// Discard a READY or FAILED session and return to IDLE
    pub async fn reset(&self) -> Result<(), RecordingError> {
        self.session.lock().await.reset()?;
        tracing::debug!("session reset");
        Ok(())
    }

    async fn process(
        &self,
        chunks: Vec<AudioChunk>,
        mime_type: AudioMimeType,
    ) -> Result<EncodedContainer, DecodeError> {
        let data = assemble_chunks(chunks);
        if data.is_empty() {
            return Err(DecodeError::EmptyInput);
        }

        let matrix = self.decoder.decode(&data, mime_type).await?;
        tracing::debug!(
            input_bytes = data.len(),
            frames = matrix.frame_count(),
            channels = matrix.channel_count(),
            "decoded recording"
        );
        Ok(wav::encode(matrix))
    }
}
