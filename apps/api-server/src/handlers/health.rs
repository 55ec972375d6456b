//! Health check endpoint.

use actix_web::{HttpResponse, web};
use relief_shared::dto::HealthResponse;

use crate::state::AppState;

/// Health check endpoint - returns server status and the active cache backend.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        cache_backend: state.cache.backend().to_string(),
    };

    HttpResponse::Ok().json(response)
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};

    use super::*;
    use crate::handlers::{configure_routes, test_support};

    #[actix_rt::test]
    async fn test_health_reports_backend() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_support::state()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.cache_backend, "memory");
    }
}
