//! TTL cache abstraction with interchangeable backends.
//!
//! Payloads cross the trait boundary as `serde_json::Value` so the same
//! contract works for the in-process map and the redis backend. Caches are
//! best effort: a missing, expired, malformed or type-mismatched entry reads
//! as a miss, never as an error.

use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

pub mod memory;
pub mod redis;

pub use self::redis::RedisCache;
pub use memory::MemoryCache;

#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the live value stored under `key`, or `None` when the key is
    /// missing or its entry has expired.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Stores or overwrites `key`. With `ttl` of `None` the entry never
    /// expires on its own. Backend write failures are logged, not surfaced.
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>);

    /// True iff a live entry exists. Observing an expired entry may evict it.
    async fn contains(&self, key: &str) -> bool;

    /// Deletes the entry if present; no-op otherwise.
    async fn remove(&self, key: &str);

    /// Deletes every entry owned by this cache instance. Dangerous when the
    /// backend is shared infrastructure (the redis backend flushes the whole
    /// database).
    async fn clear(&self);
}

/// Typed convenience layer over [`Cache`], callable on `dyn Cache`.
#[async_trait]
pub trait CacheExt: Cache {
    async fn get_json<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Send;

    async fn set_json<T>(&self, key: &str, value: &T, ttl: Option<Duration>)
    where
        T: Serialize + Sync;

    /// Cache-aside combinator: return the cached value if present and
    /// unexpired, else run `factory`, store its result under `key`, and
    /// return it.
    ///
    /// Not atomic across concurrent callers: two tasks racing on the same
    /// missing key may both run the factory and both write, last write wins.
    /// Callers must not assume at-most-one factory execution; cached values
    /// are expected to be deterministic for a given key.
    async fn get_or_add<T, F, Fut>(&self, key: &str, factory: F, ttl: Option<Duration>) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send;
}

#[async_trait]
impl<C: Cache + ?Sized> CacheExt for C {
    async fn get_json<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        let value = self.get(key).await?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::warn!("Discarding mistyped cache entry for {}: {}", key, e);
                None
            }
        }
    }

    async fn set_json<T>(&self, key: &str, value: &T, ttl: Option<Duration>)
    where
        T: Serialize + Sync,
    {
        match serde_json::to_value(value) {
            Ok(json) => self.set(key, json, ttl).await,
            Err(e) => tracing::warn!("Skipping unserializable cache entry for {}: {}", key, e),
        }
    }

    async fn get_or_add<T, F, Fut>(&self, key: &str, factory: F, ttl: Option<Duration>) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        if self.contains(key).await {
            if let Some(cached) = self.get_json(key).await {
                tracing::debug!("Cache hit for {}", key);
                return Ok(cached);
            }
        }

        tracing::debug!("Cache miss for {}", key);
        let value = factory().await?;
        self.set_json(key, &value, ttl).await;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn get_or_add_runs_factory_once_when_absent() {
        let cache = MemoryCache::new();
        let calls = AtomicUsize::new(0);

        let value: u32 = cache
            .get_or_add(
                "answer",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_or_add_skips_factory_on_live_hit() {
        let cache = MemoryCache::new();
        cache.set_json("answer", &42u32, None).await;
        let calls = AtomicUsize::new(0);

        let value: u32 = cache
            .get_or_add(
                "answer",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn get_or_add_recomputes_after_expiry() {
        let cache = MemoryCache::new();
        let calls = AtomicUsize::new(0);
        let factory = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(1u32)
        };

        let _: u32 = cache
            .get_or_add("short-lived", factory, Some(Duration::from_millis(20)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let _: u32 = cache
            .get_or_add("short-lived", factory, Some(Duration::from_millis(20)))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn get_or_add_propagates_factory_errors() {
        let cache = MemoryCache::new();

        let result: Result<u32> = cache
            .get_or_add(
                "failing",
                || async {
                    Err(crate::utils::error::NoteError::InvalidDecimal {
                        value: "x".to_string(),
                    })
                },
                None,
            )
            .await;

        assert!(result.is_err());
        assert!(!cache.contains("failing").await);
    }

    #[tokio::test]
    async fn get_json_treats_type_mismatch_as_miss() {
        let cache = MemoryCache::new();
        cache.set_json("entry", &"not a number", None).await;

        let value: Option<u32> = cache.get_json("entry").await;
        assert!(value.is_none());
    }
}
