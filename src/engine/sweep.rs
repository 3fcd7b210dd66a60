//! Scheduled eviction of expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use usher_sessions::IdempotencyCache;

/// Sweep the idempotency and reply caches forever. Expiry is also
/// enforced at read time, so this only reclaims memory; correctness
/// never depends on the sweep having run.
pub(super) async fn run(dedup: Arc<IdempotencyCache>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;
        let (seen, replies) = dedup.sweep().await;
        if seen > 0 || replies > 0 {
            debug!(seen, replies, "cache sweep evicted entries");
        }
    }
}
