use std::time::Duration;

use tracing::{info, warn};

use brandpulse_core::CoreDeps;

/// Periodic store maintenance: drop failed ledger rows past their
/// retention window and evict expired cache entries. Errors are logged
/// and the loop keeps going; the next pass retries.
pub fn start_sweep(deps: CoreDeps, interval_secs: u64, failed_retention_secs: i64) {
    info!(interval_secs, "Starting store sweep loop");

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(interval_secs)).await;

            match deps.ledger.delete_stale_failed(failed_retention_secs).await {
                Ok(0) => {}
                Ok(n) => info!(removed = n, "Swept stale failed requests"),
                Err(e) => warn!(error = %e, "Sweep: failed to delete stale requests"),
            }

            match deps.cache.evict_expired().await {
                Ok(0) => {}
                Ok(n) => info!(removed = n, "Evicted expired cache entries"),
                Err(e) => warn!(error = %e, "Sweep: cache eviction failed"),
            }
        }
    });
}
