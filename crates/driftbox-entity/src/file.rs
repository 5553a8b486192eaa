//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use driftbox_core::types::{ListItem, SortKey, SortValue};

/// A file record in the drive index.
///
/// The record is metadata only; `storage_ref` is its sole link to the
/// binary blob held by the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Unique file identifier (separate namespace from folder ids).
    pub id: u64,
    /// Display name, as uploaded.
    pub name: String,
    /// Declared content type, if known.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Blob store key of the backing binary content.
    pub storage_ref: String,
    /// Id of the containing folder; `0` denotes the root.
    pub parent_id: u64,
    /// User-flagged favorite attribute.
    #[serde(default)]
    pub starred: bool,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
}

impl File {
    /// The file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_lowercase())
    }
}

impl ListItem for File {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn item_parent(&self) -> u64 {
        self.parent_id
    }

    fn item_starred(&self) -> bool {
        self.starred
    }

    fn sort_value(&self, key: SortKey) -> Option<SortValue> {
        match key {
            SortKey::Name => Some(SortValue::Text(self.name.clone())),
            SortKey::Id => Some(SortValue::Number(self.id)),
            SortKey::CreatedAt => Some(SortValue::Time(self.created_at)),
            SortKey::Starred => Some(SortValue::Flag(self.starred)),
        }
    }
}
