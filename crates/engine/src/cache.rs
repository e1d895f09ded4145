//! Process-local read cache with per-key TTL and LRU eviction.
//!
//! The cache is a best-effort accelerator, never authoritative: a miss or a
//! stale entry always falls back to the store. Values are stored as JSON so
//! heterogeneous reads (balances, stats, enhancement lists) share one cache.
//! The compute closure in [`get_or_compute`] runs without holding the lock;
//! concurrent misses may compute twice, which is acceptable here.
//!
//! [`get_or_compute`]: Cache::get_or_compute

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::ResultEngine;

/// Cache key helpers, so every invalidation site spells keys the same way.
pub mod keys {
    use uuid::Uuid;

    pub const LEADERBOARD_PREFIX: &str = "leaderboard:";

    pub fn balance(user_id: &str) -> String {
        format!("balance:{user_id}")
    }

    pub fn stats(user_id: &str) -> String {
        format!("stats:{user_id}")
    }

    pub fn wish_enhancements(wish_id: Uuid) -> String {
        format!("wish_enhancements:{wish_id}")
    }
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Instant,
    last_access: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    tick: u64,
}

#[derive(Debug)]
pub struct Cache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl Cache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means another thread panicked mid-update;
        // cached values are still plain data.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the cached value if present and unexpired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut inner = self.lock();
        inner.tick += 1;
        let tick = inner.tick;
        match inner.entries.get_mut(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                entry.last_access = tick;
                Some(entry.value.clone())
            }
            Some(_) => {
                inner.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: &str, value: Value, ttl: Duration) {
        let mut inner = self.lock();
        inner.tick += 1;
        let tick = inner.tick;
        inner.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
                last_access: tick,
            },
        );
        if inner.entries.len() > self.capacity {
            evict_lru(&mut inner);
        }
    }

    /// Removes one exact key.
    pub fn invalidate(&self, key: &str) {
        self.lock().entries.remove(key);
    }

    /// Removes every key starting with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.lock()
            .entries
            .retain(|key, _| !key.starts_with(prefix));
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached value for `key`, computing and storing it on a miss.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> ResultEngine<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ResultEngine<T>>,
    {
        if let Some(value) = self.get(key)
            && let Ok(cached) = serde_json::from_value(value)
        {
            return Ok(cached);
        }

        let computed = compute().await?;
        if let Ok(value) = serde_json::to_value(&computed) {
            self.insert(key, value, ttl);
        }
        Ok(computed)
    }
}

fn evict_lru(inner: &mut Inner) {
    let victim = inner
        .entries
        .iter()
        .min_by_key(|(_, entry)| entry.last_access)
        .map(|(key, _)| key.clone());
    if let Some(key) = victim {
        inner.entries.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn get_returns_inserted_value() {
        let cache = Cache::new(8);
        cache.insert("balance:alice", json!(40), TTL);
        assert_eq!(cache.get("balance:alice"), Some(json!(40)));
        assert_eq!(cache.get("balance:bob"), None);
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = Cache::new(8);
        cache.insert("balance:alice", json!(40), Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("balance:alice"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn least_recently_accessed_entry_is_evicted() {
        let cache = Cache::new(2);
        cache.insert("a", json!(1), TTL);
        cache.insert("b", json!(2), TTL);
        // Touch "a" so "b" becomes the LRU victim.
        cache.get("a");
        cache.insert("c", json!(3), TTL);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(json!(1)));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("c"), Some(json!(3)));
    }

    #[test]
    fn invalidate_prefix_removes_matching_keys() {
        let cache = Cache::new(8);
        cache.insert("leaderboard:weekly", json!([]), TTL);
        cache.insert("leaderboard:all_time", json!([]), TTL);
        cache.insert("balance:alice", json!(40), TTL);
        cache.invalidate_prefix(keys::LEADERBOARD_PREFIX);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("balance:alice"), Some(json!(40)));
    }

    #[tokio::test]
    async fn get_or_compute_caches_the_computed_value() {
        let cache = Cache::new(8);
        let value: i64 = cache
            .get_or_compute("balance:alice", TTL, || async { Ok(40) })
            .await
            .unwrap();
        assert_eq!(value, 40);

        // Second read must come from the cache, not the closure.
        let value: i64 = cache
            .get_or_compute("balance:alice", TTL, || async {
                panic!("value should have been cached")
            })
            .await
            .unwrap();
        assert_eq!(value, 40);
    }

    #[tokio::test]
    async fn get_or_compute_propagates_compute_errors() {
        let cache = Cache::new(8);
        let result: ResultEngine<i64> = cache
            .get_or_compute("balance:alice", TTL, || async {
                Err(crate::EngineError::Unavailable("down".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
