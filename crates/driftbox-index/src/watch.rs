//! Background watcher that reloads the index when the file on disk is
//! edited by another process.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::store::DriveStore;

/// Spawn a task that polls the index file's modification time and reloads
/// the store when it changes. The task exits when `shutdown` flips to true.
pub fn spawn_index_watcher(
    store: Arc<DriveStore>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Index watcher started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match store.sync_external().await {
                        Ok(true) => info!("External index change applied"),
                        Ok(false) => {}
                        Err(e) => warn!(error = %e, "Index reload failed"),
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Index watcher stopping");
                        break;
                    }
                }
            }
        }
    })
}
