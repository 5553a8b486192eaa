//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for uploaded blobs.
    #[serde(default = "default_uploads_root")]
    pub uploads_root: String,
    /// Maximum upload size in bytes (default 5 GB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// How often the orphan-blob janitor runs, in seconds.
    #[serde(default = "default_janitor_interval")]
    pub janitor_interval_seconds: u64,
    /// Minimum age of an unreferenced blob before the janitor removes it.
    /// Protects blobs written by uploads whose index record is not yet
    /// committed.
    #[serde(default = "default_janitor_min_age")]
    pub janitor_min_age_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_root: default_uploads_root(),
            max_upload_size_bytes: default_max_upload(),
            janitor_interval_seconds: default_janitor_interval(),
            janitor_min_age_seconds: default_janitor_min_age(),
        }
    }
}

fn default_uploads_root() -> String {
    "data/uploads".to_string()
}

fn default_max_upload() -> u64 {
    5 * 1024 * 1024 * 1024
}

fn default_janitor_interval() -> u64 {
    3600
}

fn default_janitor_min_age() -> u64 {
    3600
}
