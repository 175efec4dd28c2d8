use crate::cache::Cache;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn is_live(&self) -> bool {
        self.expires_at.map_or(true, |at| Utc::now() < at)
    }
}

/// Process-local cache backend over a concurrent map. Expiry is lazy: an
/// expired entry is removed the moment a read observes it, there is no
/// background sweeper. Writes to the same key are last-write-wins.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let entry = self.entries.get(key)?;
        if entry.is_live() {
            return Some(entry.value.clone());
        }

        drop(entry);
        self.entries.remove(key);
        None
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let expires_at = ttl.and_then(|ttl| {
            chrono::Duration::from_std(ttl)
                .ok()
                .map(|ttl| Utc::now() + ttl)
        });
        self.entries
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    async fn contains(&self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_live() => true,
            Some(entry) => {
                drop(entry);
                self.entries.remove(key);
                false
            }
            None => false,
        }
    }

    async fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    async fn clear(&self) {
        self.entries.clear();
    }
}
