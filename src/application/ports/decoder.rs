//! Compressed audio decoder port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::{AudioMimeType, SampleMatrix};

/// Decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("No audio was recorded")]
    EmptyInput,

    #[error("Unrecognized or corrupt audio container: {0}")]
    InvalidContainer(String),

    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    #[error("Corrupt audio data: {0}")]
    CorruptData(String),

    #[error("Decoded audio has an unusable layout: {0}")]
    InvalidLayout(String),
}

/// Port for the compressed-audio codec service
#[async_trait]
pub trait AudioDecoder: Send + Sync {
    /// Decode one complete compressed container.
    ///
    /// # Arguments
    /// * `data` - Every recorded chunk, concatenated in arrival order
    /// * `mime_type` - Container type reported by the stream
    async fn decode(
        &self,
        data: &[u8],
        mime_type: AudioMimeType,
    ) -> Result<SampleMatrix, DecodeError>;
}
