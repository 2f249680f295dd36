//! Recorded chunks and the handle of the stream they come from

use std::fmt;

use crate::domain::audio::AudioMimeType;

/// One fragment of the compressed stream, exactly as the producer emitted it.
///
/// Chunks are not independently decodable; only the in-order concatenation
/// of every chunk forms a valid container.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioChunk(Vec<u8>);

impl AudioChunk {
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for AudioChunk {
    fn from(data: Vec<u8>) -> Self {
        Self(data)
    }
}

impl From<&[u8]> for AudioChunk {
    fn from(data: &[u8]) -> Self {
        Self(data.to_vec())
    }
}

/// Identifies a live stream owned by whoever produced it.
///
/// The session only remembers which stream it is recording; it never
/// reads from or closes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamHandle {
    label: String,
    mime_type: AudioMimeType,
}

impl StreamHandle {
    pub fn new(label: impl Into<String>, mime_type: AudioMimeType) -> Self {
        Self {
            label: label.into(),
            mime_type,
        }
    }

    /// Human-readable origin (file path, `stdin`, ...)
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Declared container type of the compressed stream
    pub fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    /// A handle with no label does not identify any stream
    pub fn is_empty(&self) -> bool {
        self.label.trim().is_empty()
    }
}

impl fmt::Display for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.mime_type)
    }
}
