//! Key-value cache for resolved payloads.
//!
//! Entries are JSON documents keyed by string with a per-entry expiry. Two
//! backends implement [`KvCache`]:
//!
//! - [`RedisCache`]: shared across processes, used when `cache.redis_url` is set.
//! - [`MemoryCache`]: in-process LRU, used otherwise.
//!
//! ```toml
//! [cache]
//! redis_url = "redis://localhost:6379"
//! default_ttl_seconds = 300
//! memory_capacity = 1024
//! ```

mod config;
mod keys;
mod memory;
mod redis_store;

pub use config::CacheConfig;
pub use keys::{insights_key, page_key};
pub use memory::MemoryCache;
pub use redis_store::RedisCache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CacheError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

#[async_trait]
pub trait KvCache: Send + Sync {
    /// Decoded payload stored under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Store `value` under `key`. `ttl` overrides the backend's default expiry.
    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), CacheError>;
}

/// Connect the backend selected by `config`.
pub async fn connect(config: &CacheConfig) -> Result<Arc<dyn KvCache>, CacheError> {
    match config.redis_url.as_deref() {
        Some(url) => {
            let cache = RedisCache::connect(url, config.default_ttl).await?;
            Ok(Arc::new(cache))
        }
        None => Ok(Arc::new(MemoryCache::new(config))),
    }
}
