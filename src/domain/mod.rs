//! Domain layer - Core business logic
//!
//! Contains value objects, the capture state machine, the WAV encoder
//! and domain errors. This layer has no dependencies on external systems.

pub mod audio;
pub mod capture;
pub mod config;
pub mod error;

// Re-export common types
pub use audio::{AudioMimeType, EncodedContainer, SampleMatrix};
pub use capture::{AudioChunk, CaptureDuration, CaptureSession, CaptureState, StreamHandle};
pub use config::{AppConfig, OutputSink};
pub use error::*;
