//! File operations: listing, metadata changes, download, and deletion.

use std::sync::Arc;

use tracing::info;

use driftbox_blob::{BlobStore, ByteStream};
use driftbox_core::result::AppResult;
use driftbox_core::types::ListQuery;
use driftbox_entity::File;
use driftbox_index::DriveStore;

/// File-level service over the drive store and blob store.
#[derive(Clone)]
pub struct FileService {
    store: Arc<DriveStore>,
    blobs: Arc<dyn BlobStore>,
}

impl FileService {
    pub fn new(store: Arc<DriveStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    pub async fn list(&self, query: &ListQuery) -> Vec<File> {
        self.store.list_files(query).await
    }

    pub async fn get(&self, id: u64) -> AppResult<File> {
        self.store.get_file(id).await
    }

    pub async fn rename(&self, id: u64, name: &str) -> AppResult<File> {
        self.store.rename_file(id, name).await
    }

    pub async fn move_to(&self, id: u64, new_parent_id: u64) -> AppResult<File> {
        self.store.move_file(id, new_parent_id).await
    }

    pub async fn set_starred(&self, id: u64, value: bool) -> AppResult<File> {
        self.store.set_file_starred(id, value).await
    }

    /// Open a file's content for download.
    pub async fn download(&self, id: u64) -> AppResult<(File, ByteStream)> {
        let file = self.store.get_file(id).await?;
        let stream = self.blobs.read_stream(&file.storage_ref).await?;
        Ok((file, stream))
    }

    /// Delete a file: blob first, then the record.
    ///
    /// If the blob delete fails the record stays; retrying the delete is
    /// safe because removing an absent blob succeeds.
    pub async fn delete(&self, id: u64) -> AppResult<()> {
        let file = self.store.get_file(id).await?;
        self.blobs.delete(&file.storage_ref).await?;
        self.store.remove_file(id).await?;
        info!(file_id = id, "Deleted file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use driftbox_blob::{LocalBlobStore, blob_key};
    use driftbox_core::error::ErrorKind;

    async fn service(dir: &tempfile::TempDir) -> (FileService, Arc<DriveStore>, Arc<LocalBlobStore>) {
        let store = Arc::new(
            DriveStore::open(dir.path().join("drive.json"))
                .await
                .unwrap(),
        );
        let blobs = Arc::new(
            LocalBlobStore::new(dir.path().join("uploads").to_str().unwrap())
                .await
                .unwrap(),
        );
        (FileService::new(store.clone(), blobs.clone()), store, blobs)
    }

    async fn seed_file(store: &DriveStore, blobs: &LocalBlobStore, name: &str) -> File {
        let id = store.reserve_file_id().await;
        let key = blob_key(id, name);
        blobs.write(&key, Bytes::from("payload")).await.unwrap();
        store
            .insert_file(File {
                id,
                name: name.to_string(),
                mime_type: Some("text/plain".to_string()),
                storage_ref: key,
                parent_id: 0,
                starred: false,
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_delete_removes_blob_and_record() {
        let dir = tempfile::tempdir().unwrap();
        let (files, store, blobs) = service(&dir).await;
        let file = seed_file(&store, &blobs, "a.txt").await;

        files.delete(file.id).await.unwrap();

        assert!(!blobs.exists(&file.storage_ref).await.unwrap());
        assert_eq!(
            files.get(file.id).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_download_streams_content() {
        use futures::TryStreamExt;

        let dir = tempfile::tempdir().unwrap();
        let (files, store, blobs) = service(&dir).await;
        let file = seed_file(&store, &blobs, "a.txt").await;

        let (meta, stream) = files.download(file.id).await.unwrap();
        assert_eq!(meta.id, file.id);

        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"payload");
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (files, _store, _blobs) = service(&dir).await;

        let err = files.download(99).await.err().unwrap();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
