//! Background janitor that sweeps orphaned blobs.
//!
//! Blobs become orphans when a cascade delete could not remove them or an
//! upload aborted between blob write and record commit. The min-age guard
//! keeps the sweep away from uploads still in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use driftbox_blob::BlobStore;
use driftbox_index::DriveStore;

/// Spawn the periodic orphan sweep. The task exits when `shutdown` flips
/// to true.
pub fn spawn_blob_janitor(
    store: Arc<DriveStore>,
    blobs: Arc<dyn BlobStore>,
    interval: Duration,
    min_age: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Blob janitor started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; skip it so a fresh boot does
        // not race startup uploads.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let live = store.live_storage_refs().await;
                    match blobs.sweep(&live, min_age).await {
                        Ok(0) => {}
                        Ok(n) => info!(swept = n, "Removed orphaned blobs"),
                        Err(e) => warn!(error = %e, "Blob sweep failed"),
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Blob janitor stopping");
                        break;
                    }
                }
            }
        }
    })
}
