//! Services built on top of the ports.

mod geocoding;
mod memoize;

pub use geocoding::{GEOCODE_TTL_MINUTES, GeocodingService, cache_key as geocode_cache_key};
pub use memoize::{memoize, memoize_if};

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::Value;

    use crate::domain::{CacheEntry, CacheKey, Ttl};
    use crate::error::CacheError;
    use crate::ports::{Clock, KeyValueCache, SystemClock};

    /// Minimal cache for exercising services.
    pub struct MapCache {
        entries: Mutex<HashMap<CacheKey, CacheEntry>>,
        clock: Arc<dyn Clock>,
        fail_writes: bool,
    }

    impl Default for MapCache {
        fn default() -> Self {
            Self::with_clock(Arc::new(SystemClock))
        }
    }

    impl MapCache {
        pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
                clock,
                fail_writes: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl KeyValueCache for MapCache {
        async fn get(&self, key: &CacheKey) -> Option<Value> {
            let mut entries = self.entries.lock().unwrap();
            let entry = entries.get(key)?;
            if entry.is_expired(self.clock.now()) {
                entries.remove(key);
                return None;
            }
            Some(entry.value.clone())
        }

        async fn set(&self, key: &CacheKey, value: &Value, ttl: Ttl) -> Result<(), CacheError> {
            if self.fail_writes {
                return Err(CacheError::Storage("write refused".to_string()));
            }
            let entry = CacheEntry::new(key.clone(), value.clone(), ttl, self.clock.now());
            self.entries.lock().unwrap().insert(key.clone(), entry);
            Ok(())
        }

        async fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }

        async fn purge_expired(&self) -> Result<u64, CacheError> {
            Ok(0)
        }

        fn backend(&self) -> &'static str {
            "map"
        }
    }
}
