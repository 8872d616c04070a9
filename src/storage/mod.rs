//! Filesystem storage for uploaded frames.
//!
//! Uploads are opaque blobs written under a single root directory with
//! generated names of the form `<unix-millis>-<token><ext>`. The filename is
//! the only identifier; nothing else is persisted. Files live until someone
//! deletes them; there is no cleanup or expiry policy.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::utils::validation::{safe_extension, validate_filename, ValidationError};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid filename: {0}")]
    InvalidName(#[from] ValidationError),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Upload storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Length of the random token in generated filenames
const TOKEN_LENGTH: usize = 6;

/// A file persisted by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedUpload {
    /// Generated filename, unique per save
    pub filename: String,

    /// Location on disk
    pub fs_path: PathBuf,
}

/// Filesystem-backed store rooted at the upload directory
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory uploads are written to
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload directory if it does not exist yet.
    ///
    /// Called once at startup, before the listener binds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Generate a collision-resistant filename from the current timestamp, a
    /// short random token, and the sanitized client extension (`.jpg` when the
    /// client offers nothing usable).
    #[must_use]
    pub fn generate_filename(original: Option<&str>) -> String {
        let stamp = Utc::now().timestamp_millis();
        let uuid = Uuid::new_v4().simple().to_string();
        let token = &uuid[..TOKEN_LENGTH];
        let ext = safe_extension(original);
        format!("{stamp}-{token}{ext}")
    }

    /// Persist upload bytes under a freshly generated name.
    ///
    /// Generated names are unique per call, so concurrent saves never write
    /// the same path.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the write fails.
    pub async fn save(
        &self,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<SavedUpload, StorageError> {
        let filename = Self::generate_filename(original_name);
        let fs_path = self.root.join(&filename);
        tokio::fs::write(&fs_path, bytes).await?;
        Ok(SavedUpload { filename, fs_path })
    }

    /// Read a stored file back by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidName` if the name fails validation,
    /// `StorageError::NotFound` if no such file exists, or `StorageError::Io`
    /// for other filesystem failures.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        validate_filename(name)?;
        match tokio::fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Delete a stored file by name.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`UploadStore::read`].
    pub async fn remove(&self, name: &str) -> Result<(), StorageError> {
        validate_filename(name)?;
        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_filename_shape() {
        let name = UploadStore::generate_filename(Some("frame.PNG"));
        assert!(name.ends_with(".png"));

        let (stamp, rest) = name.split_once('-').expect("timestamp separator");
        assert!(stamp.parse::<i64>().is_ok());
        assert_eq!(rest.len(), TOKEN_LENGTH + ".png".len());
    }

    #[test]
    fn test_generate_filename_defaults_to_jpg() {
        assert!(UploadStore::generate_filename(None).ends_with(".jpg"));
        assert!(UploadStore::generate_filename(Some("noext")).ends_with(".jpg"));
        assert!(UploadStore::generate_filename(Some("weird.e!t")).ends_with(".jpg"));
    }

    #[test]
    fn test_generate_filename_unique() {
        let names: HashSet<String> = (0..50)
            .map(|_| UploadStore::generate_filename(None))
            .collect();
        assert_eq!(names.len(), 50);
    }

    #[test]
    fn test_generated_names_pass_validation() {
        for _ in 0..10 {
            let name = UploadStore::generate_filename(Some("capture.jpg"));
            assert!(validate_filename(&name).is_ok(), "generated {name}");
        }
    }

    #[tokio::test]
    async fn test_save_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        store.ensure_root().await.unwrap();

        let bytes = b"\xff\xd8\xff\xe0 fake jpeg bytes";
        let saved = store.save(Some("capture.jpg"), bytes).await.unwrap();
        assert!(saved.fs_path.exists());
        assert_eq!(saved.fs_path, dir.path().join(&saved.filename));

        let read_back = store.read(&saved.filename).await.unwrap();
        assert_eq!(read_back, bytes);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        store.ensure_root().await.unwrap();

        let err = store.read("1714670000000-abc123.jpg").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_read_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let err = store.read("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        store.ensure_root().await.unwrap();

        let saved = store.save(None, b"bytes").await.unwrap();
        store.remove(&saved.filename).await.unwrap();
        assert!(!saved.fs_path.exists());

        let err = store.remove(&saved.filename).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ensure_root_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"));
        store.ensure_root().await.unwrap();
        store.ensure_root().await.unwrap();
        assert!(store.root().is_dir());
    }
}
