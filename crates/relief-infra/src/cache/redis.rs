//! Redis cache implementation. Redis enforces the TTL itself.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde_json::Value;

use relief_core::CacheError;
use relief_core::domain::{CacheKey, Ttl};
use relief_core::ports::KeyValueCache;

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }

    pub(crate) async fn connect(&self) -> Result<(Client, ConnectionManager), redis::RedisError> {
        let client = Client::open(self.url.as_str())?;
        let conn = tokio::time::timeout(self.connect_timeout, ConnectionManager::new(client.clone()))
            .await
            .map_err(|_| {
                redis::RedisError::from((redis::ErrorKind::IoError, "Connection timed out"))
            })??;
        Ok((client, conn))
    }
}

/// Redis-backed cache. Values are stored as JSON text with `SET .. EX`.
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn new(config: RedisConfig) -> Result<Self, CacheError> {
        let (_, conn) = config
            .connect()
            .await
            .map_err(|e| CacheError::Storage(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis cache");

        Ok(Self { conn })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, CacheError> {
        Self::new(RedisConfig::from_env()).await
    }
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &CacheKey) -> Option<Value> {
        let mut conn = self.conn.clone();
        let raw = match conn.get::<_, Option<String>>(key.as_str()).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Redis GET failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Dropping malformed cached value");
                if let Err(e) = conn.del::<_, ()>(key.as_str()).await {
                    tracing::warn!(key = %key, error = %e, "Redis DEL failed");
                }
                None
            }
        }
    }

    async fn set(&self, key: &CacheKey, value: &Value, ttl: Ttl) -> Result<(), CacheError> {
        let raw =
            serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        let mut conn = self.conn.clone();

        conn.set_ex::<_, _, ()>(key.as_str(), raw, ttl.as_std().as_secs())
            .await
            .map_err(|e| {
                tracing::warn!(key = %key, error = %e, "Redis SET failed");
                CacheError::Storage(e.to_string())
            })
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key.as_str())
            .await
            .map_err(|e| CacheError::Storage(e.to_string()))
    }

    async fn purge_expired(&self) -> Result<u64, CacheError> {
        Ok(0)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
