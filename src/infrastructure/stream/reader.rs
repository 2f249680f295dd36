//! File and stdin stream source adapter

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::application::ports::{CaptureRequest, ChunkStream, StreamError, StreamSource};
use crate::domain::audio::AudioMimeType;
use crate::domain::capture::{AudioChunk, StreamHandle};
use crate::domain::config::DEFAULT_CHUNK_SIZE;

/// Label used for the standard input stream
const STDIN_LABEL: &str = "stdin";

/// Chunk stream over any async reader.
///
/// Each `next_chunk` issues a single `read`, which tokio documents as
/// cancel-safe, so a dropped call never loses bytes.
pub struct ReaderChunkStream<R> {
    reader: R,
    buf: Vec<u8>,
    handle: StreamHandle,
    finished: bool,
}

impl<R> ReaderChunkStream<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Wrap `reader`, yielding chunks of at most `chunk_size` bytes
    pub fn new(reader: R, handle: StreamHandle, chunk_size: usize) -> Self {
        Self {
            reader,
            buf: vec![0; chunk_size.max(1)],
            handle,
            finished: false,
        }
    }
}

#[async_trait]
impl<R> ChunkStream for ReaderChunkStream<R>
where
    R: AsyncRead + Unpin + Send,
{
    fn handle(&self) -> StreamHandle {
        self.handle.clone()
    }

    async fn next_chunk(&mut self) -> Option<Result<AudioChunk, StreamError>> {
        if self.finished {
            return None;
        }

        loop {
            match self.reader.read(&mut self.buf).await {
                Ok(0) => {
                    tracing::debug!(stream = %self.handle, "producer ended");
                    self.finished = true;
                    return None;
                }
                Ok(n) => return Some(Ok(AudioChunk::from(&self.buf[..n]))),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(stream = %self.handle, error = %e, "read failed");
                    self.finished = true;
                    return Some(Err(StreamError::new(self.handle.label(), e.to_string())));
                }
            }
        }
    }
}

/// Stream source reading a file path or standard input
pub struct ReaderStreamSource {
    chunk_size: usize,
}

impl ReaderStreamSource {
    /// Create a source delivering chunks of `chunk_size` bytes
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Container type guessed from the file extension, WebM when unknown
    fn guess_mime_type(path: &Path) -> AudioMimeType {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(AudioMimeType::from_extension)
            .unwrap_or_default()
    }

    async fn open_file(&self, path: &Path) -> Option<Box<dyn ChunkStream>> {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "input not available");
                return None;
            }
        };
        if !metadata.is_file() || metadata.len() == 0 {
            tracing::warn!(path = %path.display(), "input is not a non-empty file");
            return None;
        }

        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to open input");
                return None;
            }
        };

        let handle = StreamHandle::new(path.display().to_string(), Self::guess_mime_type(path));
        Some(Box::new(ReaderChunkStream::new(file, handle, self.chunk_size)))
    }
}

impl Default for ReaderStreamSource {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

#[async_trait]
impl StreamSource for ReaderStreamSource {
    async fn acquire(&self, request: &CaptureRequest) -> Option<Box<dyn ChunkStream>> {
        if request.is_stdin() {
            let handle = StreamHandle::new(STDIN_LABEL, AudioMimeType::default());
            return Some(Box::new(ReaderChunkStream::new(
                tokio::io::stdin(),
                handle,
                self.chunk_size,
            )));
        }

        if request.target.trim().is_empty() {
            return None;
        }
        self.open_file(Path::new(&request.target)).await
    }
}
