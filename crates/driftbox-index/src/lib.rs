//! # driftbox-index
//!
//! The drive index: a JSON-backed tree store of folders and files with
//! serialized mutations, a pure query engine, and a watcher that picks up
//! external edits to the index file.

pub mod persist;
pub mod query;
pub mod store;
pub mod watch;

pub use store::DriveStore;
pub use watch::spawn_index_watcher;
