//! The persisted drive document.

use serde::{Deserialize, Serialize};

use crate::file::File;
use crate::folder::Folder;
use crate::user::User;

/// The single JSON document acting as the durable index.
///
/// Two collections belong to the drive engine (`folders`, `files`); the
/// `users` collection is owned by the auth layer and carried opaquely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveDocument {
    /// All folder records, in insertion order.
    #[serde(default)]
    pub folders: Vec<Folder>,
    /// All file records, in insertion order.
    #[serde(default)]
    pub files: Vec<File>,
    /// Registered user accounts.
    #[serde(default)]
    pub users: Vec<User>,
}

impl DriveDocument {
    /// Highest folder id in use, or 0 when no folders exist.
    pub fn max_folder_id(&self) -> u64 {
        self.folders.iter().map(|f| f.id).max().unwrap_or(0)
    }

    /// Highest file id in use, or 0 when no files exist.
    pub fn max_file_id(&self) -> u64 {
        self.files.iter().map(|f| f.id).max().unwrap_or(0)
    }

    /// Highest user id in use, or 0 when no users exist.
    pub fn max_user_id(&self) -> u64 {
        self.users.iter().map(|u| u.id).max().unwrap_or(0)
    }

    /// Whether a folder with the given id exists.
    pub fn folder_exists(&self, id: u64) -> bool {
        self.folders.iter().any(|f| f.id == id)
    }
}
