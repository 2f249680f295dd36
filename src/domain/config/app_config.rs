//! Application configuration value object

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidSinkError;

/// Default read size for chunked capture (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Where a finished recording goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputSink {
    /// Save to the local filesystem
    #[default]
    Local,
    /// Upload to the configured endpoint
    Remote,
}

impl OutputSink {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputSink {
    type Err = InvalidSinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            _ => Err(InvalidSinkError {
                input: s.to_string(),
            }),
        }
    }
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub output_dir: Option<String>,
    pub upload_url: Option<String>,
    pub follow_up_url: Option<String>,
    pub chunk_size: Option<usize>,
    pub sink: Option<String>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            output_dir: None,
            upload_url: None,
            follow_up_url: None,
            chunk_size: Some(DEFAULT_CHUNK_SIZE),
            sink: Some(OutputSink::Local.to_string()),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            output_dir: other.output_dir.or(self.output_dir),
            upload_url: other.upload_url.or(self.upload_url),
            follow_up_url: other.follow_up_url.or(self.follow_up_url),
            chunk_size: other.chunk_size.or(self.chunk_size),
            sink: other.sink.or(self.sink),
        }
    }

    /// Output directory, falling back to the user's download directory
    pub fn output_dir_or_default(&self) -> PathBuf {
        self.output_dir
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Chunk size, or the default if unset or zero
    pub fn chunk_size_or_default(&self) -> usize {
        self.chunk_size
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    /// Sink as parsed OutputSink, or local if not set/invalid
    pub fn sink_or_default(&self) -> OutputSink {
        match self.sink.as_deref().map(str::parse::<OutputSink>) {
            Some(Ok(sink)) => sink,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "invalid sink in config, saving locally");
                OutputSink::default()
            }
            None => OutputSink::default(),
        }
    }
}
