//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod capture;
pub mod dispatch;
pub mod ports;
pub mod recording;

// Re-export use cases
pub use capture::{
    CaptureCallbacks, CaptureInput, CaptureOutput, CaptureUseCase, StopHandle, StopReason,
};
pub use dispatch::{
    DispatchError, DispatchOutcome, OutputDispatcher, UploadReceipt, CAPTURE_FILENAME,
};
pub use recording::{RecordingController, RecordingError};
