//! # driftbox-blob
//!
//! Blob storage for uploaded file content. Records in the drive index
//! reference blobs by key; this crate owns the bytes.

pub mod key;
pub mod local;

use std::collections::HashSet;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use driftbox_core::result::AppResult;

pub use key::{blob_key, normalize_name};
pub use local::LocalBlobStore;

/// A stream of byte chunks from a blob.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// Backend-agnostic blob storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob under the given key, replacing any existing content.
    async fn write(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Open a blob as a chunked byte stream.
    async fn read_stream(&self, key: &str) -> AppResult<ByteStream>;

    /// Read a whole blob into memory.
    async fn read_bytes(&self, key: &str) -> AppResult<Bytes>;

    /// Delete a blob. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Whether a blob exists under the key.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Delete blobs whose keys are not in `live` and that are older than
    /// `min_age`. Returns how many were removed.
    async fn sweep(&self, live: &HashSet<String>, min_age: Duration) -> AppResult<usize>;
}
