use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Opaque, non-empty cache key.
///
/// Callers encode their namespace and lookup arguments into the string
/// (e.g. `geocode_manhattan`); the cache never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Result<Self, CacheError> {
        let key = key.into();
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CacheKey {
    type Error = CacheError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CacheKey {
    type Error = CacheError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

/// Time-to-live for a cache write, in whole minutes. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ttl {
    minutes: u32,
}

impl Ttl {
    /// Build a TTL from a minute count. Zero is rejected.
    pub fn minutes(minutes: u32) -> Result<Self, CacheError> {
        if minutes == 0 {
            return Err(CacheError::NonPositiveTtl(0));
        }
        Ok(Self { minutes })
    }

    /// Build a TTL from a signed minute count, as received over the wire.
    pub fn from_signed_minutes(minutes: i64) -> Result<Self, CacheError> {
        if minutes <= 0 {
            return Err(CacheError::NonPositiveTtl(minutes));
        }
        Self::minutes(u32::try_from(minutes).unwrap_or(u32::MAX))
    }

    pub fn as_minutes(&self) -> u32 {
        self.minutes
    }

    pub fn as_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.minutes))
    }

    pub fn as_std(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.minutes) * 60)
    }

    /// Absolute expiry for a write performed at `now`.
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.as_duration()
    }
}

/// A stored cache record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value: serde_json::Value,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: CacheKey, value: serde_json::Value, ttl: Ttl, now: DateTime<Utc>) -> Self {
        Self {
            key,
            value,
            expires_at: ttl.expires_at(now),
        }
    }

    /// An entry is expired once `expires_at` is strictly before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        is_expired(self.expires_at, now)
    }
}

/// Shared expiry rule for every backend.
pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at < now
}
