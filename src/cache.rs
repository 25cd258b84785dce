use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::Instant;

struct CachedBody {
    body: String,
    fetched_at: Instant,
}

/// Short-lived reuse window for upstream feed bodies, keyed by feed URL.
pub struct FeedCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedBody>>,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub async fn get(&self, url: &str) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }

        let entries = self.entries.read().await;
        entries
            .get(url)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.body.clone())
    }

    pub async fn insert(&self, url: &str, body: String) {
        if !self.is_enabled() {
            return;
        }

        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
        entries.insert(
            url.to_string(),
            CachedBody {
                body,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Serialize upstream fetches of one URL so concurrent misses share a
    /// single request. Callers re-check [`FeedCache::get`] once they hold it.
    pub async fn lock_url(&self, url: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight.entry(url.to_string()).or_default().clone()
        };
        slot.lock_owned().await
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hit_within_window() {
        let cache = FeedCache::new(Duration::from_secs(600));
        cache.insert("https://a.example.com/rss", "<rss/>".to_string()).await;

        assert_eq!(
            cache.get("https://a.example.com/rss").await.as_deref(),
            Some("<rss/>")
        );
        assert_eq!(cache.get("https://b.example.com/rss").await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = FeedCache::new(Duration::from_millis(20));
        cache.insert("https://a.example.com/rss", "old".to_string()).await;

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(cache.get("https://a.example.com/rss").await, None);
    }

    #[tokio::test]
    async fn test_insert_evicts_expired_entries() {
        let cache = FeedCache::new(Duration::from_millis(20));
        cache.insert("https://a.example.com/rss", "a".to_string()).await;

        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.insert("https://b.example.com/rss", "b".to_string()).await;

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_url_lock_is_exclusive_per_url() {
        let cache = FeedCache::new(Duration::from_secs(600));
        let held = cache.lock_url("https://a.example.com/rss").await;

        let same = tokio::time::timeout(
            Duration::from_millis(20),
            cache.lock_url("https://a.example.com/rss"),
        )
        .await;
        assert!(same.is_err());

        let other = tokio::time::timeout(
            Duration::from_millis(20),
            cache.lock_url("https://b.example.com/rss"),
        )
        .await;
        assert!(other.is_ok());

        drop(held);
        assert!(tokio::time::timeout(
            Duration::from_millis(20),
            cache.lock_url("https://a.example.com/rss"),
        )
        .await
        .is_ok());
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let cache = FeedCache::new(Duration::ZERO);
        cache.insert("https://a.example.com/rss", "body".to_string()).await;

        assert!(!cache.is_enabled());
        assert_eq!(cache.get("https://a.example.com/rss").await, None);
        assert_eq!(cache.len().await, 0);
    }
}
