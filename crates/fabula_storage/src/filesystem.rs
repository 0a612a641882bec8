//! Filesystem-based asset storage.
//!
//! Artifacts are stored in a content-addressable structure organized by
//! asset kind and content hash, which deduplicates retried generations
//! that happen to produce identical bytes.

use crate::{AssetKind, AssetStore};
use fabula_core::AssetHandle;
use fabula_error::{FabulaResult, StorageError, StorageErrorKind};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Filesystem storage backend.
///
/// Layout: `{base_path}/{kind}/{hash[0:2]}/{hash[2:4]}/{hash}`
///
/// ```text
/// /var/fabula/assets/
/// ├── image/
/// │   └── ab/
/// │       └── cd/
/// │           └── abcdef123456...  (PNG file)
/// └── document/
///     └── 12/
///         └── 34/
///             └── 123456abcdef...  (PDF file)
/// ```
///
/// Writes go to a temp file first and are renamed into place, so a
/// crashed pipeline never leaves a half-written artifact behind a
/// valid-looking handle.
pub struct FileSystemStorage {
    base_path: PathBuf,
}

impl FileSystemStorage {
    /// Create a new filesystem storage backend rooted at `base_path`.
    ///
    /// Creates the base directory if it doesn't exist.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> FabulaResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem asset storage");
        Ok(Self { base_path })
    }

    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    /// Path for a given hash and kind:
    /// `{base}/{kind}/{hash[0:2]}/{hash[2:4]}/{hash}`
    fn asset_path(&self, hash: &str, kind: AssetKind) -> PathBuf {
        self.base_path
            .join(kind.to_string())
            .join(&hash[0..2])
            .join(&hash[2..4])
            .join(hash)
    }
}

#[async_trait::async_trait]
impl AssetStore for FileSystemStorage {
    #[tracing::instrument(skip(self, data), fields(size = data.len(), kind = %kind))]
    async fn store(&self, data: &[u8], kind: AssetKind) -> FabulaResult<AssetHandle> {
        let hash = Self::compute_hash(data);
        let path = self.asset_path(&hash, kind);
        let handle = AssetHandle::new(path.to_string_lossy());

        // Same content already stored, reuse it
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(hash = %hash, path = %path.display(), "Asset already exists");
            return Ok(handle);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::info!(
            hash = %hash,
            path = %path.display(),
            size = data.len(),
            kind = %kind,
            "Stored asset"
        );

        Ok(handle)
    }

    #[tracing::instrument(skip(self), fields(handle = %handle))]
    async fn retrieve(&self, handle: &AssetHandle) -> FabulaResult<Vec<u8>> {
        let path = Path::new(handle.as_str());

        let data = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(handle.as_str().to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        tracing::debug!(path = %path.display(), size = data.len(), "Retrieved asset");
        Ok(data)
    }

    #[tracing::instrument(skip(self), fields(handle = %handle))]
    async fn delete(&self, handle: &AssetHandle) -> FabulaResult<()> {
        let path = Path::new(handle.as_str());

        tokio::fs::remove_file(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(handle.as_str().to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "delete {}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        tracing::info!(path = %path.display(), "Deleted asset");
        Ok(())
    }

    async fn exists(&self, handle: &AssetHandle) -> FabulaResult<bool> {
        Ok(tokio::fs::try_exists(Path::new(handle.as_str()))
            .await
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_and_retrieve_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSystemStorage::new(dir.path()).unwrap();

        let handle = storage.store(b"page bytes", AssetKind::Image).await.unwrap();
        let data = storage.retrieve(&handle).await.unwrap();
        assert_eq!(data, b"page bytes");
    }

    #[tokio::test]
    async fn identical_content_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSystemStorage::new(dir.path()).unwrap();

        let first = storage.store(b"cover", AssetKind::Image).await.unwrap();
        let second = storage.store(b"cover", AssetKind::Image).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn kinds_are_segregated() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSystemStorage::new(dir.path()).unwrap();

        let image = storage.store(b"same bytes", AssetKind::Image).await.unwrap();
        let doc = storage
            .store(b"same bytes", AssetKind::Document)
            .await
            .unwrap();
        assert_ne!(image, doc);
        assert!(image.as_str().contains("image"));
        assert!(doc.as_str().contains("document"));
    }

    #[tokio::test]
    async fn delete_removes_asset() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSystemStorage::new(dir.path()).unwrap();

        let handle = storage.store(b"old cover", AssetKind::Image).await.unwrap();
        assert!(storage.exists(&handle).await.unwrap());

        storage.delete(&handle).await.unwrap();
        assert!(!storage.exists(&handle).await.unwrap());

        let err = storage.retrieve(&handle).await.unwrap_err();
        assert!(format!("{err}").contains("not found"));
    }

    #[tokio::test]
    async fn missing_asset_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSystemStorage::new(dir.path()).unwrap();

        let handle = AssetHandle::new(dir.path().join("nowhere").to_string_lossy());
        let err = storage.retrieve(&handle).await.unwrap_err();
        assert!(format!("{err}").contains("not found"));
    }
}
