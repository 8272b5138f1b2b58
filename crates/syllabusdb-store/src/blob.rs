//! Blob storage for uploaded syllabus PDFs.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::BlobError;

/// Storage of file contents keyed by a relative path (the `file_path` of a
/// syllabus).
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a blob. Returns `None` when nothing is stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or the read fails.
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// Write a blob, replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or the write fails.
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), BlobError>;

    /// Delete a blob. Returns `false` when nothing was stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or the delete fails.
    async fn delete(&self, path: &str) -> Result<bool, BlobError>;
}

/// Blob store backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a blob path under the root, rejecting anything that could escape it.
    fn resolve(&self, path: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(path);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !is_plain {
            return Err(BlobError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, BlobError> {
        let full = self.resolve(path)?;
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), BlobError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<bool, BlobError> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path, "Blob already absent");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn put_get_delete() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path());

        store.put("syllabi/u1/s1.pdf", b"%PDF-1.7").await.unwrap();
        assert_eq!(
            store.get("syllabi/u1/s1.pdf").await.unwrap(),
            Some(b"%PDF-1.7".to_vec())
        );

        assert!(store.delete("syllabi/u1/s1.pdf").await.unwrap());
        assert_eq!(store.get("syllabi/u1/s1.pdf").await.unwrap(), None);
        assert!(!store.delete("syllabi/u1/s1.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path());

        for bad in ["", "../x.pdf", "/etc/passwd", "a/../../b"] {
            assert!(
                matches!(store.get(bad).await, Err(BlobError::InvalidPath(_))),
                "accepted {bad:?}"
            );
        }
    }
}
