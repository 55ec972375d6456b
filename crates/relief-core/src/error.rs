//! Error types for the ports defined in this crate.

use thiserror::Error;

/// Cache operation errors.
///
/// `EmptyKey` and `NonPositiveTtl` are caller bugs and are raised before any
/// storage access. `Storage` and `Serialization` come from the backend and
/// callers are expected to carry on without the cache.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache key must not be empty")]
    EmptyKey,

    #[error("Cache TTL must be positive, got {0} minutes")]
    NonPositiveTtl(i64),

    #[error("Cache storage failed: {0}")]
    Storage(String),

    #[error("Cache serialization failed: {0}")]
    Serialization(String),
}

impl CacheError {
    /// Whether this error was caused by invalid caller input.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CacheError::EmptyKey | CacheError::NonPositiveTtl(_))
    }
}

/// Notification bus errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to publish: {0}")]
    Publish(String),

    #[error("Failed to subscribe: {0}")]
    Subscribe(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Geocoding errors.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Location must not be empty")]
    EmptyLocation,

    #[error("Geocoding provider failed: {0}")]
    Provider(String),
}
