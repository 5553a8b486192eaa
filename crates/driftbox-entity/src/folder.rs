//! Folder entity model.

use serde::{Deserialize, Serialize};

use driftbox_core::types::{ListItem, SortKey, SortValue};

/// Id of the implicit root folder. The root always exists, is never stored
/// as a record, and is never renamed or deleted.
pub const ROOT_FOLDER_ID: u64 = 0;

/// A folder in the drive hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Unique folder identifier (separate namespace from file ids).
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Id of the containing folder; `0` denotes the root.
    pub parent_id: u64,
    /// User-flagged favorite attribute.
    #[serde(default)]
    pub starred: bool,
}

impl Folder {
    /// Whether this folder sits directly under the root.
    pub fn is_top_level(&self) -> bool {
        self.parent_id == ROOT_FOLDER_ID
    }
}

impl ListItem for Folder {
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
            // Folders carry no timestamp; they tie under created_at sorts.
            SortKey::CreatedAt => None,
            SortKey::Starred => Some(SortValue::Flag(self.starred)),
        }
    }
}
