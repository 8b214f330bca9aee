//! TTL-based response cache.
//!
//! Process-local and unbounded in key count; the key spaces in practice are
//! tiny (filter tuples, pool kinds, recently requested names). Entries expire
//! after a fixed wall-clock TTL and there is no other eviction. Nothing
//! persists across restarts.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// A thread-safe cache with time-to-live expiration.
///
/// Expired entries stop being served immediately but stay allocated until
/// `purge_expired()` runs.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
    ttl: Duration,
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Insert a value, replacing any existing entry and restarting its TTL.
    pub async fn insert(&self, key: K, value: V) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Insert an already-expired entry (tests only).
    #[cfg(test)]
    pub async fn insert_expired(&self, key: K, value: V) {
        let entry = Entry {
            value,
            expires_at: Instant::now() - Duration::from_millis(1),
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Get a value if it exists and hasn't expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let guard = self.entries.read().await;
        guard.get(key).and_then(|entry| {
            if Instant::now() < entry.expires_at {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    /// Read-through: return the cached value, or produce one with `fetch`,
    /// cache it, and return it. A failed fetch caches nothing.
    ///
    /// Concurrent misses on the same key may each run `fetch`; last write
    /// wins. That is acceptable for idempotent upstream reads.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }
        let value = fetch().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Drop a key regardless of expiry. Returns the value if one was present.
    pub async fn invalidate(&self, key: &K) -> Option<V> {
        self.entries.write().await.remove(key).map(|e| e.value)
    }

    /// Remove all expired entries and return how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut guard = self.entries.write().await;
        let before = guard.len();
        guard.retain(|_, entry| now < entry.expires_at);
        before - guard.len()
    }

    /// Current entry count, counting expired entries not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_get() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("key".to_string(), 42).await;
        assert_eq!(cache.get(&"key".to_string()).await, Some(42));
    }

    #[tokio::test]
    async fn get_returns_none_for_missing() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get(&"missing".to_string()).await, None);
    }

    #[tokio::test]
    async fn expired_entries_not_returned() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_millis(10));
        cache.insert_expired("key".to_string(), 42).await;
        assert_eq!(cache.get(&"key".to_string()).await, None);
    }

    #[tokio::test]
    async fn read_through_fetches_on_miss_and_caches() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(60));

        let fetched = cache
            .get_or_try_insert_with("key".to_string(), || async { Ok::<_, String>(7) })
            .await;
        assert_eq!(fetched, Ok(7));

        // Second call must not invoke the fetcher.
        let cached = cache
            .get_or_try_insert_with("key".to_string(), || async {
                Err::<i32, _>("fetcher ran twice".to_string())
            })
            .await;
        assert_eq!(cached, Ok(7));
    }

    #[tokio::test]
    async fn read_through_does_not_cache_failures() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(60));

        let failed = cache
            .get_or_try_insert_with("key".to_string(), || async {
                Err::<i32, _>("upstream down".to_string())
            })
            .await;
        assert!(failed.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("key".to_string(), 42).await;
        assert_eq!(cache.invalidate(&"key".to_string()).await, Some(42));
        assert_eq!(cache.get(&"key".to_string()).await, None);
    }

    #[tokio::test]
    async fn purge_drops_only_expired() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_millis(10));
        cache.insert_expired("old1".to_string(), 1).await;
        cache.insert_expired("old2".to_string(), 2).await;
        cache.insert("fresh".to_string(), 3).await;

        assert_eq!(cache.purge_expired().await, 2);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&"fresh".to_string()).await, Some(3));
    }
}
