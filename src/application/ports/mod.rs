//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod decoder;
pub mod file_saver;
pub mod monitor;
pub mod stream_source;
pub mod uploader;

// Re-export common types
pub use config::ConfigStore;
pub use decoder::{AudioDecoder, DecodeError};
pub use file_saver::{FileSaver, SaveError};
pub use monitor::{AudioMonitor, MonitorError};
pub use stream_source::{CaptureRequest, ChunkStream, StreamError, StreamSource};
pub use uploader::{UploadError, UploadRequest, Uploader};
