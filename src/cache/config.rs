//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_MEMORY_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis connection URL; the in-process backend is used when absent.
    pub redis_url: Option<String>,
    /// Expiry applied when a write does not override it.
    pub default_ttl: Duration,
    /// Maximum entries held by the in-process backend.
    pub memory_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            default_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            redis_url: settings.redis_url.clone(),
            default_ttl: settings.default_ttl,
            memory_capacity: settings.memory_capacity.get(),
        }
    }
}

impl CacheConfig {
    /// Returns the memory capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn memory_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
