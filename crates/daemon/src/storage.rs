use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("refusing to write file named {0:?}")]
    InvalidFilename(String),
}

/// Where downloaded payloads land.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `bytes` as `dir/filename` and return the absolute path. Writing
    /// the same file twice leaves one copy.
    async fn save_to_destination(
        &self,
        dir: &Path,
        filename: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StorageError>;
}

/// Blackhole directories on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

#[async_trait]
impl Storage for FsStorage {
    async fn save_to_destination(
        &self,
        dir: &Path,
        filename: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let name = confine_filename(filename)?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        let path = tokio::fs::canonicalize(&path).await?;
        info!(path = %path.display(), bytes = bytes.len(), "payload saved");
        Ok(path)
    }
}

/// Reduce a suggested file name to its last path component.
pub fn confine_filename(filename: &str) -> Result<&str, StorageError> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    }
    Ok(name)
}
