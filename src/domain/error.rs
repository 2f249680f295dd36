//! Domain error types

use thiserror::Error;

/// Error when parsing a capture duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected e.g. 45s, 2m, 1m30s or 1h")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when an unknown output sink name is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid sink: \"{input}\". Valid sinks are: local, remote")]
pub struct InvalidSinkError {
    pub input: String,
}

/// Error when a decoded sample layout cannot form a sample matrix
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleMatrixError {
    #[error("Sample matrix needs at least one channel")]
    NoChannels,

    #[error("Too many channels: {0} (max 32767)")]
    TooManyChannels(usize),

    #[error("Sample rate must be positive")]
    ZeroSampleRate,

    #[error("Channel {channel} has {actual} frames, expected {expected}")]
    RaggedChannels {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Interleaved buffer of {len} samples is not divisible by {channels} channels")]
    PartialFrame { len: usize, channels: usize },

    #[error("Byte rate of {sample_rate} Hz x {channels} channels overflows the WAV header")]
    ByteRateOverflow { sample_rate: u32, channels: usize },

    #[error("Recording too large for a WAV container ({frames} frames x {channels} channels)")]
    TooLarge { frames: usize, channels: usize },
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
