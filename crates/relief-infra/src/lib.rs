//! # Relief Infrastructure
//!
//! Concrete implementations of the ports defined in `relief-core`.
//! This crate contains database, cache, notification and geocoding integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL cache table via SeaORM
//! - `redis` - Redis support for cache and notification bus
//! - `geocoding` - Nominatim geocoder via reqwest, throttled with governor

pub mod cache;
pub mod notify;

#[cfg(feature = "postgres")]
pub mod database;

#[cfg(feature = "geocoding")]
pub mod geocoding;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use notify::InMemoryNotificationBus;

#[cfg(feature = "postgres")]
pub use cache::PostgresCache;
#[cfg(feature = "postgres")]
pub use database::DatabaseConfig;

#[cfg(feature = "geocoding")]
pub use geocoding::{GeocoderConfig, NominatimGeocoder};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
#[cfg(feature = "redis")]
pub use notify::RedisNotificationBus;
