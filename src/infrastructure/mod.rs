//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces: file and
//! stdin capture, symphonia and libopus decoding, rodio playback, local
//! saving, HTTP upload and the TOML config file.

pub mod config;
pub mod decoding;
pub mod playback;
pub mod storage;
pub mod stream;
pub mod upload;

// Re-export adapters
pub use config::XdgConfigStore;
pub use decoding::SymphoniaDecoder;
pub use playback::RodioMonitor;
pub use storage::LocalFileSaver;
pub use stream::ReaderStreamSource;
pub use upload::HttpUploader;
