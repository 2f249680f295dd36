//! Local save port interface

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Local save errors
#[derive(Debug, Clone, Error)]
pub enum SaveError {
    #[error("Failed to create output directory {path}: {message}")]
    CreateDir { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("No free file name for {0}")]
    NoFreeName(String),
}

/// Port for the file-save service
#[async_trait]
pub trait FileSaver: Send + Sync {
    /// Store `data` under (a variant of) `filename`.
    ///
    /// Choosing the final location is the saver's job; the returned path
    /// is where the bytes actually landed.
    async fn save(&self, data: &[u8], filename: &str) -> Result<PathBuf, SaveError>;
}
