//! Cached location lookup.

use actix_web::{HttpResponse, web};
use relief_shared::dto::{GeocodeQuery, GeocodeResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/geocode?location=...
pub async fn geocode(
    state: web::Data<AppState>,
    query: web::Query<GeocodeQuery>,
) -> AppResult<HttpResponse> {
    let location = query.into_inner().location;

    let coordinates = state
        .geocoding
        .locate(&location)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Could not resolve location '{location}'")))?;

    Ok(HttpResponse::Ok().json(GeocodeResponse {
        location,
        lat: coordinates.lat,
        lng: coordinates.lng,
    }))
}
