//! Playback port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::EncodedContainer;

/// Playback errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    #[error("No audio output device: {0}")]
    DeviceNotAvailable(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Port for listening to a finished recording
#[async_trait]
pub trait AudioMonitor: Send + Sync {
    /// Play `recording` to the speakers and wait until it has finished.
    ///
    /// Dropping the returned future stops playback.
    async fn play(&self, recording: &EncodedContainer) -> Result<(), MonitorError>;
}
