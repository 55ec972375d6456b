//! Application state - shared across all handlers.

use std::sync::Arc;

use relief_core::ports::{Geocoder, KeyValueCache, NotificationBus};
use relief_core::services::GeocodingService;
use relief_infra::{InMemoryCache, InMemoryNotificationBus, NominatimGeocoder};

use crate::config::{AppConfig, CacheBackendKind, NotifyBackendKind};

/// Shared application state. Every collaborator receives the same cache
/// client explicitly.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn KeyValueCache>,
    pub notifications: Arc<dyn NotificationBus>,
    pub geocoding: GeocodingService,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let cache = build_cache(config).await;
        let notifications = build_notifications(config).await;
        let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimGeocoder::new(config.geocoder.clone())?);

        tracing::info!(cache_backend = cache.backend(), "Application state initialized");

        Ok(Self::from_parts(cache, notifications, geocoder))
    }

    pub fn from_parts(
        cache: Arc<dyn KeyValueCache>,
        notifications: Arc<dyn NotificationBus>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        let geocoding = GeocodingService::new(cache.clone(), geocoder);
        Self {
            cache,
            notifications,
            geocoding,
        }
    }
}

async fn build_cache(config: &AppConfig) -> Arc<dyn KeyValueCache> {
    match config.cache_backend {
        CacheBackendKind::Memory => memory_cache(),
        CacheBackendKind::Postgres => postgres_cache(config).await,
        CacheBackendKind::Redis => redis_cache(config).await,
        CacheBackendKind::Auto => {
            #[cfg(feature = "postgres")]
            let has_database = config.database.is_some();
            #[cfg(not(feature = "postgres"))]
            let has_database = false;

            if has_database {
                return postgres_cache(config).await;
            }
            tracing::warn!("DATABASE_URL not set. Running with in-memory cache.");
            memory_cache()
        }
    }
}

fn memory_cache() -> Arc<dyn KeyValueCache> {
    Arc::new(InMemoryCache::new())
}

#[cfg(feature = "postgres")]
async fn postgres_cache(config: &AppConfig) -> Arc<dyn KeyValueCache> {
    let Some(db_config) = config.database.as_ref() else {
        tracing::error!("CACHE_BACKEND=postgres but DATABASE_URL is not set. Using in-memory cache.");
        return memory_cache();
    };

    match relief_infra::database::connect(db_config).await {
        Ok(conn) => Arc::new(relief_infra::PostgresCache::new(conn)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory cache.");
            memory_cache()
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn postgres_cache(_config: &AppConfig) -> Arc<dyn KeyValueCache> {
    tracing::error!("Built without the postgres feature. Using in-memory cache.");
    memory_cache()
}

#[cfg(feature = "redis")]
async fn redis_cache(config: &AppConfig) -> Arc<dyn KeyValueCache> {
    match relief_infra::RedisCache::new(config.redis.clone()).await {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to Redis. Using in-memory cache.");
            memory_cache()
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn redis_cache(_config: &AppConfig) -> Arc<dyn KeyValueCache> {
    tracing::error!("Built without the redis feature. Using in-memory cache.");
    memory_cache()
}

async fn build_notifications(config: &AppConfig) -> Arc<dyn NotificationBus> {
    let memory = || -> Arc<dyn NotificationBus> {
        Arc::new(InMemoryNotificationBus::new(config.notify_buffer_size))
    };

    match config.notify_backend {
        NotifyBackendKind::Memory => memory(),
        #[cfg(feature = "redis")]
        NotifyBackendKind::Redis => {
            match relief_infra::RedisNotificationBus::new(config.redis.clone()).await {
                Ok(bus) => Arc::new(bus),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to connect to Redis. Using in-memory bus.");
                    memory()
                }
            }
        }
        #[cfg(not(feature = "redis"))]
        NotifyBackendKind::Redis => {
            tracing::error!("Built without the redis feature. Using in-memory bus.");
            memory()
        }
    }
}
