//! Shared application state threaded through every handler.

use std::sync::Arc;

use driftbox_auth::AuthService;
use driftbox_blob::BlobStore;
use driftbox_core::config::AppConfig;
use driftbox_index::DriveStore;
use driftbox_service::{FileService, FolderService, UploadService};

/// Application state injected into handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<DriveStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub auth: AuthService,
    pub folders: FolderService,
    pub files: FileService,
    pub uploads: UploadService,
}
