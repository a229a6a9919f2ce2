//! Media storage for uploaded audio files.
//!
//! [`MediaStorage`] abstracts over where bytes live; [`FilesystemStorage`]
//! keeps them under a local media root that the API also serves statically.
//! Paths handed to and returned from a backend are always logical, relative,
//! `/`-separated names such as `voice_notes/memo.mp3`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use rand::distr::Alphanumeric;
use rand::Rng;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::notes::with_name_suffix;

/// Length of the random suffix appended when a file name is already taken.
pub const NAME_SUFFIX_LENGTH: usize = 7;

/// How many suffixed names to try before giving up.
const MAX_NAME_ATTEMPTS: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("No free file name for {0}")]
    NameExhausted(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage backend for uploaded media.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Persist `data` under `path`, or under a suffixed variant when `path`
    /// is taken. Returns the logical path actually written.
    async fn save(&self, path: &str, data: &[u8]) -> StorageResult<String>;

    /// Read the full contents stored at `path`.
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>>;

    /// Remove the file at `path`. Missing files are not an error.
    async fn delete(&self, path: &str) -> StorageResult<()>;

    /// Whether a file exists at `path`.
    async fn exists(&self, path: &str) -> StorageResult<bool>;
}

/// Local filesystem backend rooted at the configured media directory.
#[derive(Debug, Clone)]
pub struct FilesystemStorage {
    root: PathBuf,
}

impl FilesystemStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a logical path onto the media root, refusing anything that could
    /// escape it.
    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Create `full_path` exclusively. `Ok(false)` means the name is taken.
    async fn write_new(full_path: &Path, data: &[u8]) -> StorageResult<bool> {
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(full_path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        file.write_all(data).await?;
        file.sync_all().await?;
        Ok(true)
    }
}

#[async_trait]
impl MediaStorage for FilesystemStorage {
    async fn save(&self, path: &str, data: &[u8]) -> StorageResult<String> {
        let mut candidate = path.to_string();

        for _ in 0..MAX_NAME_ATTEMPTS {
            let full_path = self.resolve(&candidate)?;
            if Self::write_new(&full_path, data).await? {
                tracing::debug!(path = %candidate, size = data.len(), "Stored media file");
                return Ok(candidate);
            }
            candidate = with_name_suffix(path, &random_suffix());
        }

        Err(StorageError::NameExhausted(path.to_string()))
    }

    async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let full_path = self.resolve(path)?;
        Ok(fs::read(full_path).await?)
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let full_path = self.resolve(path)?;
        Ok(fs::try_exists(full_path).await?)
    }
}

fn random_suffix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NAME_SUFFIX_LENGTH)
        .map(char::from)
        .collect()
}
