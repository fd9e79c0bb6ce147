use std::time::Duration;
use tracing::{info, warn};

use storynest_api::session_store::SqliteStore;

/// Background task that prunes expired sessions.
///
/// Expired records never load, so this only keeps the table from growing.
pub async fn run_session_sweep(store: SqliteStore, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        match store.delete_expired().await {
            Ok(0) => {}
            Ok(count) => info!("Cleanup: pruned {} expired sessions", count),
            Err(e) => warn!("Session cleanup error: {}", e),
        }
    }
}
