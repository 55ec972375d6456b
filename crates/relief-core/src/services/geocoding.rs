//! Geocoding with a 24-hour cache in front of the provider.

use std::sync::Arc;

use crate::domain::{CacheKey, Coordinates, Ttl};
use crate::error::GeocodeError;
use crate::ports::{Geocoder, KeyValueCache};

use super::memoize::memoize_if;

/// Place geometry rarely changes, so geocodes are kept for a day.
pub const GEOCODE_TTL_MINUTES: u32 = 1440;

const GEOCODE_NAMESPACE: &str = "geocode_";

/// Resolves place names, consulting the cache before the provider.
#[derive(Clone)]
pub struct GeocodingService {
    cache: Arc<dyn KeyValueCache>,
    geocoder: Arc<dyn Geocoder>,
}

impl GeocodingService {
    pub fn new(cache: Arc<dyn KeyValueCache>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { cache, geocoder }
    }

    /// Resolve `location`. Misses are not cached so a later lookup retries.
    pub async fn locate(&self, location: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let location = location.trim();
        let key = cache_key(location)?;
        let ttl = Ttl::minutes(GEOCODE_TTL_MINUTES)
            .map_err(|e| GeocodeError::Provider(e.to_string()))?;

        let geocoder = self.geocoder.clone();
        memoize_if(
            self.cache.as_ref(),
            &key,
            ttl,
            || async move { geocoder.geocode(location).await },
            Option::is_some,
        )
        .await
    }
}

/// `"  New   York "` becomes `geocode_new_york`.
pub fn cache_key(location: &str) -> Result<CacheKey, GeocodeError> {
    let normalized = location
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");

    if normalized.is_empty() {
        return Err(GeocodeError::EmptyLocation);
    }

    CacheKey::new(format!("{GEOCODE_NAMESPACE}{normalized}"))
        .map_err(|_| GeocodeError::EmptyLocation)
}
