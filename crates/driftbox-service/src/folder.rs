//! Folder operations: listing, tree manipulation, starring, and recursive
//! deletion.

use std::sync::Arc;

use tracing::{info, warn};

use driftbox_blob::BlobStore;
use driftbox_core::result::AppResult;
use driftbox_core::types::ListQuery;
use driftbox_entity::Folder;
use driftbox_index::DriveStore;

/// Folder-level service over the drive store.
#[derive(Clone)]
pub struct FolderService {
    store: Arc<DriveStore>,
    blobs: Arc<dyn BlobStore>,
}

impl FolderService {
    pub fn new(store: Arc<DriveStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    pub async fn list(&self, query: &ListQuery) -> Vec<Folder> {
        self.store.list_folders(query).await
    }

    pub async fn get(&self, id: u64) -> AppResult<Folder> {
        self.store.get_folder(id).await
    }

    pub async fn create(&self, name: &str, parent_id: u64) -> AppResult<Folder> {
        let folder = self.store.create_folder(name, parent_id).await?;
        info!(folder_id = folder.id, parent_id, "Created folder");
        Ok(folder)
    }

    pub async fn rename(&self, id: u64, name: &str) -> AppResult<Folder> {
        self.store.rename_folder(id, name).await
    }

    pub async fn move_to(&self, id: u64, new_parent_id: u64) -> AppResult<Folder> {
        let folder = self.store.move_folder(id, new_parent_id).await?;
        info!(folder_id = id, new_parent_id, "Moved folder");
        Ok(folder)
    }

    pub async fn set_starred(&self, id: u64, value: bool) -> AppResult<Folder> {
        self.store.set_folder_starred(id, value).await
    }

    /// Delete a folder and everything under it.
    ///
    /// The record removal is a single committed operation; blob cleanup
    /// happens afterwards. A blob that fails to delete is logged and left
    /// for the janitor sweep.
    pub async fn delete_recursive(&self, id: u64) -> AppResult<()> {
        let removed = self.store.delete_folder_recursive(id).await?;
        info!(folder_id = id, files = removed.len(), "Deleted folder subtree");

        for file in removed {
            if let Err(e) = self.blobs.delete(&file.storage_ref).await {
                warn!(
                    file_id = file.id,
                    storage_ref = %file.storage_ref,
                    error = %e,
                    "Failed to delete blob for removed file"
                );
            }
        }
        Ok(())
    }
}
