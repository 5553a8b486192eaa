//! # driftbox-entity
//!
//! Domain entities for Driftbox: folders, files, users, and the persisted
//! drive document they live in.

pub mod document;
pub mod file;
pub mod folder;
pub mod user;

pub use document::DriveDocument;
pub use file::File;
pub use folder::{Folder, ROOT_FOLDER_ID};
pub use user::{PublicUser, User};
