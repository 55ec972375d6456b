//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Request to store a cache entry.
///
/// `ttl_minutes` is signed so a zero or negative value reaches validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutCacheEntryRequest {
    pub value: serde_json::Value,
    pub ttl_minutes: i64,
}

/// A live cache entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntryResponse {
    pub key: String,
    pub value: serde_json::Value,
}

/// Query string for a geocoding lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeQuery {
    pub location: String,
}

/// A resolved location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeocodeResponse {
    pub location: String,
    pub lat: f64,
    pub lng: f64,
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub cache_backend: String,
}
