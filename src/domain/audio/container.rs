//! Encoded audio container value object

use std::fmt;
use std::sync::Arc;

/// Audio MIME types seen on either side of the conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioMimeType {
    #[default]
    Webm,
    Ogg,
    Wav,
}

impl AudioMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Webm => "audio/webm",
            Self::Ogg => "audio/ogg",
            Self::Wav => "audio/wav",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Ogg => "ogg",
            Self::Wav => "wav",
        }
    }

    /// Guess the type from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "webm" | "mkv" => Some(Self::Webm),
            "ogg" | "oga" | "opus" => Some(Self::Ogg),
            "wav" => Some(Self::Wav),
            _ => None,
        }
    }
}

impl fmt::Display for AudioMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A finished WAV file held in memory.
///
/// Cloning is cheap: the byte buffer is shared, so every sink sees the same
/// read-only bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedContainer {
    bytes: Arc<[u8]>,
    sample_rate: u32,
    channel_count: u16,
    frame_count: usize,
}

impl EncodedContainer {
    pub(crate) fn new(
        bytes: Vec<u8>,
        sample_rate: u32,
        channel_count: u16,
        frame_count: usize,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            sample_rate,
            channel_count,
            frame_count,
        }
    }

    /// Always `audio/wav`
    pub fn mime_type(&self) -> AudioMimeType {
        AudioMimeType::Wav
    }

    /// The complete file, header included
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Playback length in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count as f64 / self.sample_rate as f64
    }

    /// Playback length rounded to whole seconds (half away from zero)
    pub fn rounded_duration_secs(&self) -> u64 {
        self.duration_secs().round() as u64
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        format_size(self.size_bytes())
    }
}

/// Format a byte count as B, KB or MB
pub fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
