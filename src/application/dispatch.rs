//! Output dispatch use case
//!
//! Hands a READY recording to exactly one sink per call. Neither sink
//! touches the session, so a failed upload leaves the container in place
//! for a retry or a local save.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::audio::EncodedContainer;
use crate::domain::capture::CaptureState;
use crate::domain::config::OutputSink;

use super::ports::{AudioDecoder, FileSaver, SaveError, UploadError, UploadRequest, Uploader};
use super::recording::RecordingController;

/// Fixed name for every saved or uploaded recording
pub const CAPTURE_FILENAME: &str = "muteone_capture.wav";

/// Placeholder replaced by the upload id in follow-up URL templates
pub const UPLOAD_ID_PLACEHOLDER: &str = "{upload_id}";

/// Errors from the dispatcher
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("Nothing to send: recording is {0}, not ready")]
    NotReady(CaptureState),

    #[error("Save failed: {0}")]
    Save(#[from] SaveError),

    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Upload interrupted")]
    Interrupted,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Server-assigned identifier
    pub upload_id: String,
    /// Follow-up resource built from the configured template, if any
    pub follow_up_url: Option<String>,
}

/// Where a recording ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Saved(PathBuf),
    Uploaded(UploadReceipt),
}

/// Expand `{upload_id}` in a follow-up URL template
pub fn follow_up_url(template: &str, upload_id: &str) -> String {
    template.replace(UPLOAD_ID_PLACEHOLDER, upload_id)
}

/// Output dispatcher
pub struct OutputDispatcher<F, U>
where
    F: FileSaver,
    U: Uploader,
{
    saver: F,
    uploader: U,
    follow_up_template: Option<String>,
}

impl<F, U> OutputDispatcher<F, U>
where
    F: FileSaver,
    U: Uploader,
{
    /// Create a new dispatcher
    pub fn new(saver: F, uploader: U) -> Self {
        Self {
            saver,
            uploader,
            follow_up_template: None,
        }
    }

    /// Build follow-up URLs from `template` after each upload
    pub fn with_follow_up(mut self, template: impl Into<String>) -> Self {
        self.follow_up_template = Some(template.into());
        self
    }

    /// Send the controller's READY recording to `sink`.
    pub async fn dispatch<D: AudioDecoder>(
        &self,
        controller: &RecordingController<D>,
        sink: OutputSink,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Some(container) = controller.container().await else {
            return Err(DispatchError::NotReady(controller.state().await));
        };

        match sink {
            OutputSink::Local => self.save_local(&container).await.map(DispatchOutcome::Saved),
            OutputSink::Remote => self
                .send_remote(&container)
                .await
                .map(DispatchOutcome::Uploaded),
        }
    }

    /// Save the container through the file-save service
    pub async fn save_local(&self, container: &EncodedContainer) -> Result<PathBuf, DispatchError> {
        let path = self.saver.save(container.bytes(), CAPTURE_FILENAME).await?;
        tracing::info!(path = %path.display(), bytes = container.size_bytes(), "recording saved");
        Ok(path)
    }

    /// Upload the container and collect the server's upload id
    pub async fn send_remote(
        &self,
        container: &EncodedContainer,
    ) -> Result<UploadReceipt, DispatchError> {
        let request = UploadRequest::new(container.clone(), CAPTURE_FILENAME);
        tracing::info!(
            bytes = request.file_size,
            duration_secs = request.estimated_duration,
            "uploading recording"
        );

        let upload_id = match self.uploader.upload(&request).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "upload failed, recording kept");
                return Err(e.into());
            }
        };

        let follow_up_url = self
            .follow_up_template
            .as_deref()
            .map(|template| follow_up_url(template, &upload_id));
        tracing::info!(upload_id = %upload_id, "recording uploaded");

        Ok(UploadReceipt {
            upload_id,
            follow_up_url,
        })
    }
}
