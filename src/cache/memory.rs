//! In-process cache backend.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use serde_json::Value;
use tokio::time::Instant;
use tracing::warn;

use super::config::CacheConfig;
use super::{CacheError, KvCache};

struct Entry {
    payload: String,
    expires_at: Instant,
}

/// LRU-bounded map of encoded payloads with per-entry expiry.
///
/// Expired entries are dropped lazily on read.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, Entry>>,
    default_ttl: Duration,
}

impl MemoryCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.memory_capacity_non_zero())),
            default_ttl: config.default_ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries("len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A poisoned map is still usable: every entry is self-contained.
    fn entries(&self, op: &'static str) -> MutexGuard<'_, LruCache<String, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!(
                target = "pageinsight::cache::memory",
                op,
                result = "poisoned_recovered",
                "Recovered from poisoned cache map"
            );
            poisoned.into_inner()
        })
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[async_trait]
impl KvCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let payload = {
            let mut entries = self.entries("get");
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => Some(entry.payload.clone()),
                Some(_) => {
                    entries.pop(key);
                    None
                }
                None => None,
            }
        };

        payload
            .map(|payload| serde_json::from_str(&payload))
            .transpose()
            .map_err(CacheError::from)
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), CacheError> {
        let payload = serde_json::to_string(value)?;
        let expires_at = Instant::now() + ttl.unwrap_or(self.default_ttl);
        self.entries("set").put(
            key.to_string(),
            Entry {
                payload,
                expires_at,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn cache_with(capacity: usize) -> MemoryCache {
        MemoryCache::new(&CacheConfig {
            memory_capacity: capacity,
            ..CacheConfig::default()
        })
    }

    #[tokio::test]
    async fn stores_and_decodes_payloads() {
        let cache = MemoryCache::default();
        let payload = json!({"page_id": "acme", "specialties": ["AI"]});

        cache.set("page:acme", &payload, None).await.unwrap();

        assert_eq!(cache.get("page:acme").await.unwrap(), Some(payload));
        assert_eq!(cache.get("page:other").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_default_ttl() {
        let cache = MemoryCache::default();
        cache.set("k", &json!(1), None).await.unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get("k").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn per_write_ttl_overrides_default() {
        let cache = MemoryCache::default();
        cache
            .set("short", &json!("x"), Some(Duration::from_secs(5)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(cache.get("short").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn least_recently_used_entry_is_evicted() {
        let cache = cache_with(2);
        cache.set("a", &json!(1), None).await.unwrap();
        cache.set("b", &json!(2), None).await.unwrap();
        cache.get("a").await.unwrap();
        cache.set("c", &json!(3), None).await.unwrap();

        assert!(cache.get("b").await.unwrap().is_none());
        assert_eq!(cache.get("a").await.unwrap(), Some(json!(1)));
        assert_eq!(cache.len(), 2);
    }
}
