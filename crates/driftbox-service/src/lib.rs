//! # driftbox-service
//!
//! Business services composing the drive index and blob store: folder and
//! file operations, upload ingestion, and the orphan-blob janitor.

pub mod file;
pub mod folder;
pub mod janitor;
pub mod upload;

pub use file::FileService;
pub use folder::FolderService;
pub use janitor::spawn_blob_janitor;
pub use upload::UploadService;
