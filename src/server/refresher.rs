//! Background catalog refresher.

use crate::cache::CatalogCache;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Keep the snapshot warm: refresh whenever it is missing or expired.
///
/// Checks immediately, then every `interval`, until `shutdown` is cancelled.
/// Goes through the same single-flight path as request-driven refreshes.
pub fn spawn_refresher(
    catalog: CatalogCache,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Background refresher started (every {}s)", interval.as_secs());
        loop {
            if catalog.needs_refresh() {
                debug!("Background refresh due");
                catalog.get_snapshot(false).await;
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
        info!("Background refresher stopped");
    })
}
