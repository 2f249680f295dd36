//! Stream source port interfaces

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::capture::{AudioChunk, StreamHandle};

/// What the caller wants captured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Source to open: a file path, or `-` for standard input
    pub target: String,
}

impl CaptureRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Whether the request points at standard input
    pub fn is_stdin(&self) -> bool {
        self.target == "-"
    }
}

/// A stream that broke after it was acquired
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("reading {stream} failed: {reason}")]
pub struct StreamError {
    pub stream: String,
    pub reason: String,
}

impl StreamError {
    pub fn new(stream: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            reason: reason.into(),
        }
    }
}

/// A live producer of compressed chunks.
///
/// The producer runs on its own schedule; `next_chunk` resolves when the
/// next fragment is available and returns `None` once the producer has
/// ceased cleanly. A producer that breaks yields one `Err` and then ends.
/// Implementations must be cancel-safe: dropping a pending `next_chunk`
/// future must not lose already-delivered chunks.
#[async_trait]
pub trait ChunkStream: Send {
    /// Handle identifying the underlying stream
    fn handle(&self) -> StreamHandle;

    /// Wait for the next chunk
    async fn next_chunk(&mut self) -> Option<Result<AudioChunk, StreamError>>;
}

/// Port for acquiring a live audio stream
#[async_trait]
pub trait StreamSource: Send + Sync {
    /// Try to open the requested stream.
    ///
    /// # Returns
    /// The chunk stream, or `None` when no stream can be obtained
    async fn acquire(&self, request: &CaptureRequest) -> Option<Box<dyn ChunkStream>>;
}
