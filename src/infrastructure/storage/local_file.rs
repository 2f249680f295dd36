//! Local file saver adapter

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::application::ports::{FileSaver, SaveError};

/// Highest numeric suffix tried before giving up
const MAX_SUFFIX: u32 = 999;

/// Saves files into a directory without overwriting existing ones
pub struct LocalFileSaver {
    dir: PathBuf,
}

impl LocalFileSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `name.ext` for attempt 0, `name (n).ext` afterwards
    fn candidate(filename: &str, attempt: u32) -> String {
        if attempt == 0 {
            return filename.to_string();
        }
        let path = Path::new(filename);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{stem} ({attempt}).{ext}"),
            None => format!("{stem} ({attempt})"),
        }
    }
}

/// Write `data` into a freshly created `path`, deleting it again on failure
async fn write_or_remove<W>(mut file: W, path: &Path, data: &[u8]) -> Result<(), SaveError>
where
    W: AsyncWrite + Unpin,
{
    let written = match file.write_all(data).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };
    drop(file);

    if let Err(e) = written {
        if let Err(remove_err) = fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %remove_err, "could not remove partial file");
        }
        return Err(SaveError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl FileSaver for LocalFileSaver {
    async fn save(&self, data: &[u8], filename: &str) -> Result<PathBuf, SaveError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SaveError::CreateDir {
                path: self.dir.display().to_string(),
                message: e.to_string(),
            })?;

        for attempt in 0..=MAX_SUFFIX {
            let path = self.dir.join(Self::candidate(filename, attempt));
            let file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(SaveError::Write {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })
                }
            };

            write_or_remove(file, &path, data).await?;
            tracing::debug!(path = %path.display(), bytes = data.len(), "file written");
            return Ok(path);
        }

        Err(SaveError::NoFreeName(filename.to_string()))
    }
}
