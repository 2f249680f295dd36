//! Rodio playback adapter
//!
//! Plays the finished WAV back through the default output device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};

use crate::application::ports::{AudioMonitor, MonitorError};
use crate::domain::audio::wav::WAV_HEADER_SIZE;
use crate::domain::audio::EncodedContainer;

/// How often the playback thread checks whether it was cancelled
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Monitor implementation using rodio
#[derive(Debug, Clone, Copy, Default)]
pub struct RodioMonitor;

impl RodioMonitor {
    pub fn new() -> Self {
        Self
    }
}

/// Sets the flag when the owning future goes away
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// The PCM payload of a WAV container as samples
fn pcm_samples(recording: &EncodedContainer) -> Vec<i16> {
    recording
        .bytes()
        .get(WAV_HEADER_SIZE..)
        .unwrap_or_default()
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[async_trait]
impl AudioMonitor for RodioMonitor {
    async fn play(&self, recording: &EncodedContainer) -> Result<(), MonitorError> {
        let samples = pcm_samples(recording);
        let channels = recording.channel_count();
        let sample_rate = recording.sample_rate();
        if samples.is_empty() || channels == 0 || sample_rate == 0 {
            return Ok(());
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let _guard = CancelOnDrop(Arc::clone(&cancelled));
        tokio::task::spawn_blocking(move || {
            play_blocking(SamplesBuffer::new(channels, sample_rate, samples), &cancelled)
        })
        .await
        .map_err(|e| MonitorError::PlaybackFailed(format!("Task join error: {}", e)))?
    }
}

/// Play until the buffer runs out or `cancelled` is set (called from spawn_blocking)
fn play_blocking(source: SamplesBuffer<i16>, cancelled: &AtomicBool) -> Result<(), MonitorError> {
    let (_stream, stream_handle) = OutputStream::try_default()
        .map_err(|e| MonitorError::DeviceNotAvailable(e.to_string()))?;

    let sink =
        Sink::try_new(&stream_handle).map_err(|e| MonitorError::PlaybackFailed(e.to_string()))?;
    sink.append(source);

    while !sink.empty() {
        if cancelled.load(Ordering::SeqCst) {
            tracing::debug!("playback cancelled");
            sink.stop();
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    Ok(())
}
