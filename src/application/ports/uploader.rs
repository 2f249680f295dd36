//! Remote upload port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::{AudioMimeType, EncodedContainer};

/// Upload errors
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("Upload request failed: {0}")]
    RequestFailed(String),

    #[error("Upload rejected with HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Failed to parse upload response: {0}")]
    ParseError(String),

    #[error("Upload response did not contain an uploadId")]
    MissingUploadId,

    #[error("No upload URL configured. Set MUTEONE_UPLOAD_URL or run 'muteone config set upload_url <url>'")]
    NotConfigured,
}

/// Everything the transport sends for one recording
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// The WAV file
    pub container: EncodedContainer,
    /// Name the file is sent under
    pub filename: String,
    /// Byte length of the file
    pub file_size: usize,
    /// Duration in whole seconds, rounded
    pub estimated_duration: u64,
}

impl UploadRequest {
    pub fn new(container: EncodedContainer, filename: impl Into<String>) -> Self {
        Self {
            file_size: container.size_bytes(),
            estimated_duration: container.rounded_duration_secs(),
            filename: filename.into(),
            container,
        }
    }

    /// MIME type of the attached file
    pub fn mime_type(&self) -> AudioMimeType {
        self.container.mime_type()
    }
}

/// Port for the remote-upload transport
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Send the recording and return the server-assigned upload id.
    async fn upload(&self, request: &UploadRequest) -> Result<String, UploadError>;
}
