use crate::cache::Cache;
use crate::utils::error::Result;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use std::time::Duration;

/// Distributed cache backend over a shared redis database. Values are stored
/// as JSON text and the TTL maps to redis' native per-key expiry, so entries
/// survive process restarts and are visible to every connected instance.
///
/// All operations are best effort: a backend failure degrades to a miss (or a
/// dropped write) with a warn log, matching the [`Cache`] contract.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connects to the redis instance at `url` (e.g. `redis://127.0.0.1:6379`).
    /// The connection manager reconnects on its own after transient failures.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = match conn.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Redis GET failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw?) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding malformed cache entry for {}: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let payload = match serde_json::to_string(&value) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Skipping unserializable cache entry for {}: {}", key, e);
                return;
            }
        };

        let mut conn = self.conn.clone();
        let outcome: redis::RedisResult<()> = match ttl {
            // Redis expiries are whole seconds; round sub-second TTLs up.
            Some(ttl) => conn.set_ex(key, payload, ttl.as_secs().max(1)).await,
            None => conn.set(key, payload).await,
        };
        if let Err(e) = outcome {
            tracing::warn!("Redis SET failed for {}: {}", key, e);
        }
    }

    async fn contains(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();
        match conn.exists(key).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!("Redis EXISTS failed for {}: {}", key, e);
                false
            }
        }
    }

    async fn remove(&self, key: &str) {
        let mut conn = self.conn.clone();
        let outcome: redis::RedisResult<()> = conn.del(key).await;
        if let Err(e) = outcome {
            tracing::warn!("Redis DEL failed for {}: {}", key, e);
        }
    }

    /// Flushes the whole redis database this cache is connected to, not just
    /// the keys this process wrote. Do not call against shared production
    /// infrastructure.
    async fn clear(&self) {
        let mut conn = self.conn.clone();
        let outcome: redis::RedisResult<()> = redis::cmd("FLUSHDB").query_async(&mut conn).await;
        if let Err(e) = outcome {
            tracing::warn!("Redis FLUSHDB failed: {}", e);
        }
    }
}
