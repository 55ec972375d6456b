//! Cache implementations - PostgreSQL, Redis and in-memory fallback.

mod memory;

pub use memory::InMemoryCache;

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
pub use postgres::PostgresCache;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisCache, RedisConfig};
