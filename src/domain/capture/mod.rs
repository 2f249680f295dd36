//! Capture domain module

mod chunk;
mod duration;
mod session;

pub use chunk::{AudioChunk, StreamHandle};
pub use duration::CaptureDuration;
pub use session::{CaptureSession, CaptureState, InvalidStateTransition, StartError};
