//! In-memory cache implementation - used when no database is configured.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use relief_core::CacheError;
use relief_core::domain::{CacheEntry, CacheKey, Ttl};
use relief_core::ports::{Clock, KeyValueCache, SystemClock};

/// In-memory cache using a simple HashMap with async RwLock.
///
/// Note: Data is lost on process restart and is not shared between
/// processes.
pub struct InMemoryCache {
    store: RwLock<HashMap<CacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueCache for InMemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<Value> {
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if !entry.is_expired(self.clock.now()) {
            return Some(entry.value.clone());
        }
        drop(store);

        // Re-check under the write lock: a concurrent set may have refreshed it.
        let mut store = self.store.write().await;
        let now = self.clock.now();
        match store.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                store.remove(key);
                tracing::debug!(key = %key, "Evicted expired entry");
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &CacheKey, value: &Value, ttl: Ttl) -> Result<(), CacheError> {
        let entry = CacheEntry::new(key.clone(), value.clone(), ttl, self.clock.now());
        self.store.write().await.insert(key.clone(), entry);
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
        self.store.write().await.remove(key);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, CacheError> {
        let now = self.clock.now();
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired(now));
        Ok((before - store.len()) as u64)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
