//! Local filesystem blob store.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tracing::{debug, warn};

use driftbox_core::error::{AppError, ErrorKind};
use driftbox_core::result::AppResult;

use crate::{BlobStore, ByteStream};

/// Blob store backed by a directory on the local filesystem. Keys map
/// directly to file names under the root.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all blobs.
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a blob store rooted at the given directory, creating it if
    /// necessary.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create blob root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a blob key to a path under the root. Keys never contain
    /// path separators, so a blob cannot escape the root.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(AppError::validation(format!("Invalid blob key: {key}")));
        }
        Ok(self.root.join(key))
    }

    async fn sweep_entry(
        &self,
        path: &Path,
        live: &HashSet<String>,
        min_age: Duration,
        now: SystemTime,
    ) -> AppResult<bool> {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => return Ok(false),
        };
        if live.contains(&name) {
            return Ok(false);
        }

        let meta = fs::metadata(path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to stat blob", e)
        })?;
        // Young orphans may belong to an upload whose record is not
        // committed yet.
        let age = meta
            .modified()
            .ok()
            .and_then(|m| now.duration_since(m).ok())
            .unwrap_or(Duration::ZERO);
        if age < min_age {
            return Ok(false);
        }

        fs::remove_file(path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to sweep blob: {name}"), e)
        })?;
        debug!(key = %name, "Swept orphaned blob");
        Ok(true)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn write(&self, key: &str, data: Bytes) -> AppResult<()> {
        let path = self.resolve(key)?;
        fs::write(&path, &data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write blob: {key}"), e)
        })?;
        debug!(key, bytes = data.len(), "Wrote blob");
        Ok(())
    }

    async fn read_stream(&self, key: &str) -> AppResult<ByteStream> {
        let path = self.resolve(key)?;
        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {key}"))
            } else {
                AppError::with_source(ErrorKind::Storage, format!("Failed to open blob: {key}"), e)
            }
        })?;

        let stream = tokio_util::io::ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(Bytes::from))))
    }

    async fn read_bytes(&self, key: &str) -> AppResult<Bytes> {
        let path = self.resolve(key)?;
        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {key}"))
            } else {
                AppError::with_source(ErrorKind::Storage, format!("Failed to read blob: {key}"), e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Deleting an absent blob is fine; the record is the source
            // of truth.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete blob: {key}"),
                e,
            )),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.resolve(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn sweep(&self, live: &HashSet<String>, min_age: Duration) -> AppResult<usize> {
        let now = SystemTime::now();
        let mut dir = fs::read_dir(&self.root).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to list blob root", e)
        })?;

        let mut swept = 0;
        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read blob entry", e)
        })? {
            match self.sweep_entry(&entry.path(), live, min_age, now).await {
                Ok(true) => swept += 1,
                Ok(false) => {}
                Err(e) => warn!(error = %e, "Skipping blob during sweep"),
            }
        }
        Ok(swept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    async fn store(dir: &tempfile::TempDir) -> LocalBlobStore {
        LocalBlobStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_write_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = store(&dir).await;

        let data = Bytes::from("hello world");
        blobs.write("1-hello.txt", data.clone()).await.unwrap();
        assert!(blobs.exists("1-hello.txt").await.unwrap());

        let read_back = blobs.read_bytes("1-hello.txt").await.unwrap();
        assert_eq!(read_back, data);

        blobs.delete("1-hello.txt").await.unwrap();
        assert!(!blobs.exists("1-hello.txt").await.unwrap());

        // Deleting again is not an error.
        blobs.delete("1-hello.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_read_stream_yields_content() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = store(&dir).await;

        blobs.write("2-a.bin", Bytes::from("stream me")).await.unwrap();

        let chunks: Vec<Bytes> = blobs
            .read_stream("2-a.bin")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        let joined: Vec<u8> = chunks.concat();
        assert_eq!(joined, b"stream me");
    }

    #[tokio::test]
    async fn test_missing_blob_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = store(&dir).await;

        let err = blobs.read_bytes("9-missing").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = store(&dir).await;

        let err = blobs.read_bytes("../etc/passwd").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_sweep_removes_old_orphans_only() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = store(&dir).await;

        blobs.write("1-live.txt", Bytes::from("a")).await.unwrap();
        blobs.write("2-orphan.txt", Bytes::from("b")).await.unwrap();

        let live = HashSet::from(["1-live.txt".to_string()]);

        // Fresh orphans survive the min-age guard.
        let swept = blobs.sweep(&live, Duration::from_secs(3600)).await.unwrap();
        assert_eq!(swept, 0);

        let swept = blobs.sweep(&live, Duration::ZERO).await.unwrap();
        assert_eq!(swept, 1);
        assert!(blobs.exists("1-live.txt").await.unwrap());
        assert!(!blobs.exists("2-orphan.txt").await.unwrap());
    }
}
