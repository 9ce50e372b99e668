//! Redis cache backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde_json::Value;
use tracing::info;

use super::{CacheError, KvCache};

/// Payloads are stored as JSON strings with `SET key value EX ttl`.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    default_ttl: Duration,
}

impl RedisCache {
    pub async fn connect(url: &str, default_ttl: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(CacheError::backend)?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(CacheError::backend)?;
        info!(target = "pageinsight::cache", "Connected to Redis cache");
        Ok(Self {
            connection,
            default_ttl,
        })
    }
}

#[async_trait]
impl KvCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut connection = self.connection.clone();
        let payload: Option<String> = connection.get(key).await.map_err(CacheError::backend)?;
        payload
            .map(|payload| serde_json::from_str(&payload))
            .transpose()
            .map_err(CacheError::from)
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), CacheError> {
        let payload = serde_json::to_string(value)?;
        // Redis rejects a zero expiry.
        let seconds = ttl.unwrap_or(self.default_ttl).as_secs().max(1);
        let mut connection = self.connection.clone();
        connection
            .set_ex::<_, _, ()>(key, payload, seconds)
            .await
            .map_err(CacheError::backend)
    }
}
