//! Cache-aside memoization over a [`KeyValueCache`].

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{CacheKey, Ttl};
use crate::ports::KeyValueCache;

/// Return the cached value for `key`, or run `fetch` and cache its result.
///
/// A cached value that no longer deserializes as `T` counts as a miss.
/// Fetch errors are returned untouched and nothing is written.
pub async fn memoize<T, E, F, Fut>(
    cache: &dyn KeyValueCache,
    key: &CacheKey,
    ttl: Ttl,
    fetch: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    memoize_if(cache, key, ttl, fetch, |_| true).await
}

/// Like [`memoize`], but only writes results accepted by `cacheable`.
pub async fn memoize_if<T, E, F, Fut, P>(
    cache: &dyn KeyValueCache,
    key: &CacheKey,
    ttl: Ttl,
    fetch: F,
    cacheable: P,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnOnce(&T) -> bool,
{
    if let Some(value) = cache.get(key).await {
        match serde_json::from_value::<T>(value) {
            Ok(hit) => {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(hit);
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cached value has unexpected shape");
            }
        }
    }

    tracing::debug!(key = %key, "Cache miss");
    let fresh = fetch().await?;

    if cacheable(&fresh) {
        match serde_json::to_value(&fresh) {
            Ok(value) => {
                if let Err(e) = cache.set(key, &value, ttl).await {
                    tracing::warn!(key = %key, error = %e, "Failed to cache result");
                }
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Result is not JSON-serializable");
            }
        }
    }

    Ok(fresh)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::services::testing::MapCache;

    fn key(s: &str) -> CacheKey {
        CacheKey::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_second_call_served_from_cache() {
        let cache = MapCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let ttl = Ttl::minutes(30).unwrap();

        for _ in 0..2 {
            let calls = calls.clone();
            let out: Result<String, ()> = memoize(&cache, &key("summary_1"), ttl, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("flooding on 5th".to_string())
            })
            .await;
            assert_eq!(out.unwrap(), "flooding on 5th");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_not_cached() {
        let cache = MapCache::default();
        let ttl = Ttl::minutes(15).unwrap();

        let out: Result<u32, &str> =
            memoize(&cache, &key("k"), ttl, || async { Err("upstream down") }).await;

        assert_eq!(out, Err("upstream down"));
        assert!(cache.get(&key("k")).await.is_none());
    }

    #[tokio::test]
    async fn test_wrong_shape_refetched() {
        let cache = MapCache::default();
        let ttl = Ttl::minutes(60).unwrap();
        cache
            .set(&key("k"), &json!({"unexpected": true}), ttl)
            .await
            .unwrap();

        let out: Result<u32, ()> = memoize(&cache, &key("k"), ttl, || async { Ok(7) }).await;

        assert_eq!(out, Ok(7));
        assert_eq!(cache.get(&key("k")).await, Some(json!(7)));
    }

    #[tokio::test]
    async fn test_set_failure_still_returns_result() {
        let cache = MapCache::failing();
        let ttl = Ttl::minutes(60).unwrap();

        let out: Result<String, ()> =
            memoize(&cache, &key("k"), ttl, || async { Ok("live".to_string()) }).await;

        assert_eq!(out.unwrap(), "live");
    }
}
