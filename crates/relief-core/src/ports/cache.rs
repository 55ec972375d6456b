use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{CacheKey, Ttl};
use crate::error::CacheError;

/// Expiring key/value cache - abstraction over caching backends
/// (PostgreSQL, Redis, in-memory).
///
/// The cache is advisory. Backend failures never surface from `get`; they
/// read as a miss. Argument validation happens when building [`CacheKey`]
/// and [`Ttl`], so an invalid call cannot reach storage.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Get a live value. An expired entry is evicted and reported as absent.
    async fn get(&self, key: &CacheKey) -> Option<Value>;

    /// Upsert a value expiring `ttl` from now, replacing any prior entry.
    async fn set(&self, key: &CacheKey, value: &Value, ttl: Ttl) -> Result<(), CacheError>;

    /// Remove an entry. Deleting an absent key succeeds.
    async fn delete(&self, key: &CacheKey) -> Result<(), CacheError>;

    /// Remove every expired entry and return how many were dropped.
    async fn purge_expired(&self) -> Result<u64, CacheError>;

    /// Short backend name for health output and logs.
    fn backend(&self) -> &'static str;
}
