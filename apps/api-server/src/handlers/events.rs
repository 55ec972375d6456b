//! Server-sent event relay for notification topics.

use actix_web::{HttpResponse, http::header, web};
use futures::StreamExt;
use relief_core::domain::Notification;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/events/{topic}
///
/// Streams every notification published on `topic` until the client
/// disconnects.
pub async fn stream_events(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let topic = path.into_inner();

    let stream = state
        .notifications
        .subscribe(&topic)
        .await
        .map_err(|e| AppError::Unavailable(e.to_string()))?;

    tracing::debug!(topic = %topic, "Event stream opened");

    let body = stream.map(|n| Ok::<_, actix_web::Error>(web::Bytes::from(render_event(&n))));

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(body))
}

/// Format one notification as an SSE frame.
fn render_event(notification: &Notification) -> String {
    format!(
        "event: {}\ndata: {}\n\n",
        notification.event, notification.payload
    )
}

#[cfg(test)]
mod tests {
    use actix_web::App;
    use actix_web::test::{TestRequest, call_service, init_service};
    use serde_json::json;

    use super::*;
    use crate::handlers::{configure_routes, test_support};

    #[test]
    fn test_render_event() {
        let n = Notification::new("cache", "cache_updated", json!({"key": "k"}));
        assert_eq!(
            render_event(&n),
            "event: cache_updated\ndata: {\"key\":\"k\"}\n\n"
        );
    }

    #[actix_rt::test]
    async fn test_stream_headers() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(test_support::state()))
                .configure(configure_routes),
        )
        .await;

        let req = TestRequest::get().uri("/api/events/cache").to_request();
        let resp = call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );
    }
}
