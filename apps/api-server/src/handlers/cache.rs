//! Cache administration endpoints.

use actix_web::{HttpResponse, web};
use serde_json::json;

use relief_core::domain::{CacheKey, Notification, Ttl};
use relief_shared::dto::{CacheEntryResponse, PutCacheEntryRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Topic carrying cache administration events.
pub const CACHE_TOPIC: &str = "cache";

/// GET /api/cache/{key}
pub async fn get_entry(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let key = CacheKey::new(path.into_inner())?;

    let value = state
        .cache
        .get(&key)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No live entry for key {key}")))?;

    Ok(HttpResponse::Ok().json(CacheEntryResponse {
        key: key.into(),
        value,
    }))
}

/// PUT /api/cache/{key}
pub async fn put_entry(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<PutCacheEntryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let key = CacheKey::new(path.into_inner())?;
    let ttl = Ttl::from_signed_minutes(req.ttl_minutes)?;

    state.cache.set(&key, &req.value, ttl).await?;
    tracing::debug!(key = %key, ttl_minutes = ttl.as_minutes(), "Cache entry stored");

    announce(&state, "cache_updated", &key).await;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/cache/{key}
pub async fn delete_entry(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let key = CacheKey::new(path.into_inner())?;

    state.cache.delete(&key).await?;

    announce(&state, "cache_invalidated", &key).await;
    Ok(HttpResponse::NoContent().finish())
}

async fn announce(state: &AppState, event: &str, key: &CacheKey) {
    let notification = Notification::new(CACHE_TOPIC, event, json!({ "key": key.as_str() }));
    if let Err(e) = state.notifications.publish(&notification).await {
        tracing::warn!(event = %event, key = %key, error = %e, "Failed to publish notification");
    }
}
