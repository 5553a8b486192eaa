//! Persistence gateway for the drive document.
//!
//! The whole index lives in one JSON file. Saves go through a temp file in
//! the same directory followed by a rename, so readers of the path never
//! observe a half-written document.

use std::path::Path;
use std::time::SystemTime;

use tokio::fs;
use tracing::debug;

use driftbox_core::error::{AppError, ErrorKind};
use driftbox_core::result::AppResult;
use driftbox_entity::DriveDocument;

/// Load the document from disk. A missing file yields an empty document.
pub async fn load(path: &Path) -> AppResult<DriveDocument> {
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(DriveDocument::default());
        }
        Err(e) => {
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read index file: {}", path.display()),
                e,
            ));
        }
    };

    serde_json::from_slice(&raw).map_err(|e| {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("Index file is not valid JSON: {}", path.display()),
            e,
        )
    })
}

/// Durably write the document, returning the file's new modification time.
pub async fn save(path: &Path, doc: &DriveDocument) -> AppResult<SystemTime> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create index directory: {}", parent.display()),
                    e,
                )
            })?;
        }
    }

    let raw = serde_json::to_vec_pretty(doc)?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &raw).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to write index temp file: {}", tmp.display()),
            e,
        )
    })?;
    fs::rename(&tmp, path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to replace index file: {}", path.display()),
            e,
        )
    })?;

    debug!(path = %path.display(), bytes = raw.len(), "Wrote index file");

    Ok(modified(path).await?.unwrap_or_else(SystemTime::now))
}

/// Modification time of the index file, `None` when it does not exist.
pub async fn modified(path: &Path) -> AppResult<Option<SystemTime>> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(meta.modified().ok()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to stat index file: {}", path.display()),
            e,
        )),
    }
}
