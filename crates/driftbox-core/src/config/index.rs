//! Drive index (persisted document) configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the persisted drive document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Path of the JSON document holding folders, files, and users.
    #[serde(default = "default_index_path")]
    pub path: String,
    /// Whether to watch the document for external changes and reload.
    #[serde(default = "default_watch")]
    pub watch: bool,
    /// Poll interval for the external-change watcher, in milliseconds.
    #[serde(default = "default_watch_interval")]
    pub watch_interval_ms: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: default_index_path(),
            watch: default_watch(),
            watch_interval_ms: default_watch_interval(),
        }
    }
}

fn default_index_path() -> String {
    "data/drive.json".to_string()
}

fn default_watch() -> bool {
    true
}

fn default_watch_interval() -> u64 {
    2000
}
