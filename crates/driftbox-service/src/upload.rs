//! Upload ingestion: validate, store the blob, then commit the record.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use driftbox_blob::{BlobStore, blob_key};
use driftbox_core::error::AppError;
use driftbox_core::result::AppResult;
use driftbox_entity::File;
use driftbox_index::DriveStore;

/// Ingests uploaded content into the blob store and the drive index.
#[derive(Clone)]
pub struct UploadService {
    store: Arc<DriveStore>,
    blobs: Arc<dyn BlobStore>,
    /// Maximum accepted upload size in bytes.
    max_size_bytes: u64,
}

impl UploadService {
    pub fn new(store: Arc<DriveStore>, blobs: Arc<dyn BlobStore>, max_size_bytes: u64) -> Self {
        Self {
            store,
            blobs,
            max_size_bytes,
        }
    }

    /// Ingest one upload into `parent_id`.
    ///
    /// Order matters: the id is reserved first, the blob is written under
    /// the derived key, and the record is committed last. A record never
    /// references a blob that does not exist; a failed commit leaves at
    /// worst an orphaned blob for the janitor.
    pub async fn ingest(
        &self,
        name: &str,
        mime_type: Option<String>,
        parent_id: u64,
        data: Bytes,
    ) -> AppResult<File> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Upload name is required"));
        }
        if data.len() as u64 > self.max_size_bytes {
            return Err(AppError::validation(format!(
                "Upload exceeds the maximum size of {} bytes",
                self.max_size_bytes
            )));
        }
        // Fail before touching storage when the target folder is absent.
        if parent_id != driftbox_entity::ROOT_FOLDER_ID {
            self.store.get_folder(parent_id).await.map_err(|_| {
                AppError::not_found(format!("Parent folder {parent_id} not found"))
            })?;
        }

        let id = self.store.reserve_file_id().await;
        let key = blob_key(id, name);
        let size = data.len();

        self.blobs.write(&key, data).await?;

        let mime_type = mime_type.or_else(|| mime_from_name(name));
        let record = File {
            id,
            name: name.to_string(),
            mime_type,
            storage_ref: key.clone(),
            parent_id,
            starred: false,
            created_at: Utc::now(),
        };

        match self.store.insert_file(record).await {
            Ok(file) => {
                info!(file_id = file.id, parent_id, bytes = size, "Ingested upload");
                Ok(file)
            }
            Err(e) => {
                // The reserved id is simply skipped; the blob must not
                // linger as an immediate orphan.
                if let Err(cleanup) = self.blobs.delete(&key).await {
                    warn!(key = %key, error = %cleanup, "Failed to clean up blob after aborted upload");
                }
                Err(e)
            }
        }
    }
}

/// Guess a MIME type from a file name extension.
fn mime_from_name(name: &str) -> Option<String> {
    let ext = name.rsplit('.').next()?.to_lowercase();
    let mime = match ext.as_str() {
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "csv" => "text/csv",
        _ => return None,
    };
    Some(mime.to_string())
}
