//! Time-windowed idempotency caches.
//!
//! Two independent tables guard against the upstream transport's
//! redelivery behavior: message ids already processed, and replies
//! already generated for a (user, text) pair that arrives twice in
//! quick succession. Entries carry explicit expiry instants; reads
//! treat expired-but-unswept entries as absent, and a scheduled sweep
//! keeps the maps bounded under low traffic.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use usher_core::sanitize::{normalize_text, normalize_user_id};

/// Seen message ids and recently generated replies, each with its own
/// eviction window.
pub struct IdempotencyCache {
    seen_window: Duration,
    reply_window: Duration,
    seen_ids: Mutex<HashMap<String, Instant>>,
    recent_replies: Mutex<HashMap<(String, String), (Instant, String)>>,
}

impl IdempotencyCache {
    pub fn new(seen_window: Duration, reply_window: Duration) -> Self {
        Self {
            seen_window,
            reply_window,
            seen_ids: Mutex::new(HashMap::new()),
            recent_replies: Mutex::new(HashMap::new()),
        }
    }

    /// Whether this message id was already processed within the
    /// window. Expired entries read as unseen and are dropped on the
    /// spot.
    pub async fn has_seen(&self, message_id: &str) -> bool {
        let mut seen = self.seen_ids.lock().await;
        match seen.get(message_id) {
            Some(at) if at.elapsed() < self.seen_window => true,
            Some(_) => {
                seen.remove(message_id);
                false
            }
            None => false,
        }
    }

    /// Record a message id as processed.
    pub async fn mark_seen(&self, message_id: &str) {
        self.seen_ids
            .lock()
            .await
            .insert(message_id.to_string(), Instant::now());
    }

    /// A still-fresh reply previously generated for this user and
    /// text, if any. Text is normalized the same way `cache_reply`
    /// normalizes it.
    pub async fn cached_reply(&self, user_id: &str, text: &str) -> Option<String> {
        let key = (normalize_user_id(user_id), normalize_text(text));
        let mut replies = self.recent_replies.lock().await;
        match replies.get(&key) {
            Some((at, content)) if at.elapsed() < self.reply_window => Some(content.clone()),
            Some(_) => {
                replies.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Remember a generated reply for duplicate suppression.
    pub async fn cache_reply(&self, user_id: &str, text: &str, content: &str) {
        let key = (normalize_user_id(user_id), normalize_text(text));
        self.recent_replies
            .lock()
            .await
            .insert(key, (Instant::now(), content.to_string()));
    }

    /// Drop all cached replies for one user. Called on rebinding so a
    /// pending reply never crosses a business boundary.
    pub async fn purge_user(&self, user_id: &str) {
        let user = normalize_user_id(user_id);
        let mut replies = self.recent_replies.lock().await;
        let before = replies.len();
        replies.retain(|(owner, _), _| *owner != user);
        let dropped = before - replies.len();
        if dropped > 0 {
            debug!(user = %user, dropped, "purged cached replies");
        }
    }

    /// Evict everything past its window. Returns (ids, replies)
    /// dropped, for the sweep task's log line.
    pub async fn sweep(&self) -> (usize, usize) {
        let mut seen = self.seen_ids.lock().await;
        let before_ids = seen.len();
        seen.retain(|_, at| at.elapsed() < self.seen_window);
        let dropped_ids = before_ids - seen.len();
        drop(seen);

        let mut replies = self.recent_replies.lock().await;
        let before_replies = replies.len();
        replies.retain(|_, (at, _)| at.elapsed() < self.reply_window);
        let dropped_replies = before_replies - replies.len();

        (dropped_ids, dropped_replies)
    }

    /// Release the cache, reporting what is being dropped.
    pub async fn close(&self) {
        let ids = self.seen_ids.lock().await.len();
        let replies = self.recent_replies.lock().await.len();
        info!(ids, replies, "idempotency cache closed");
        self.seen_ids.lock().await.clear();
        self.recent_replies.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_cache() -> IdempotencyCache {
        IdempotencyCache::new(Duration::from_millis(50), Duration::from_millis(30))
    }

    #[tokio::test]
    async fn seen_ids_are_remembered_within_the_window() {
        let cache = short_cache();
        assert!(!cache.has_seen("SM1").await);
        cache.mark_seen("SM1").await;
        assert!(cache.has_seen("SM1").await);
        assert!(!cache.has_seen("SM2").await);
    }

    #[tokio::test]
    async fn expired_ids_read_as_unseen_without_a_sweep() {
        let cache = short_cache();
        cache.mark_seen("SM1").await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!cache.has_seen("SM1").await);
    }

    #[tokio::test]
    async fn replies_are_reused_within_the_window() {
        let cache = short_cache();
        cache.cache_reply("972501111111", "hello", "hi there").await;
        assert_eq!(
            cache.cached_reply("972501111111", "hello").await.as_deref(),
            Some("hi there")
        );
    }

    #[tokio::test]
    async fn replies_expire_after_the_window() {
        let cache = short_cache();
        cache.cache_reply("972501111111", "hello", "hi there").await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.cached_reply("972501111111", "hello").await, None);
    }

    #[tokio::test]
    async fn reply_keys_normalize_text_and_user() {
        let cache = short_cache();
        cache
            .cache_reply("whatsapp:+972501111111", "  Hello ", "hi there")
            .await;
        assert_eq!(
            cache.cached_reply("972501111111", "hello").await.as_deref(),
            Some("hi there")
        );
    }

    #[tokio::test]
    async fn purge_user_drops_only_that_user() {
        let cache = short_cache();
        cache.cache_reply("972501111111", "hello", "a").await;
        cache.cache_reply("972502222222", "hello", "b").await;

        cache.purge_user("whatsapp:+972501111111").await;
        assert_eq!(cache.cached_reply("972501111111", "hello").await, None);
        assert_eq!(
            cache.cached_reply("972502222222", "hello").await.as_deref(),
            Some("b")
        );
    }

    #[tokio::test]
    async fn sweep_drops_expired_and_keeps_fresh() {
        let cache = short_cache();
        cache.mark_seen("old").await;
        cache.cache_reply("972501111111", "old", "x").await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        cache.mark_seen("fresh").await;

        let (ids, replies) = cache.sweep().await;
        assert_eq!(ids, 1);
        assert_eq!(replies, 1);
        assert!(cache.has_seen("fresh").await);
    }
}
