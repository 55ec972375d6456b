//! HTTP handlers and route configuration.

mod cache;
mod events;
mod geocode;
mod health;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            // Cache administration
            .service(
                web::resource("/cache/{key:.*}")
                    .route(web::get().to(cache::get_entry))
                    .route(web::put().to(cache::put_entry))
                    .route(web::delete().to(cache::delete_entry)),
            )
            .route("/geocode", web::get().to(geocode::geocode))
            // Notification relay
            .route("/events/{topic}", web::get().to(events::stream_events)),
    );
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use relief_core::GeocodeError;
    use relief_core::domain::Coordinates;
    use relief_core::ports::Geocoder;
    use relief_infra::{InMemoryCache, InMemoryNotificationBus};

    use crate::state::AppState;

    /// Resolves "manhattan" only and counts every provider call.
    #[derive(Default)]
    pub struct StubGeocoder {
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn geocode(&self, location: &str) -> Result<Option<Coordinates>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match location.to_lowercase().as_str() {
                "manhattan" => Ok(Some(Coordinates::new(40.78, -73.97))),
                "atlantis" => Ok(None),
                _ => Err(GeocodeError::Provider("provider offline".into())),
            }
        }
    }

    pub fn state_with(geocoder: Arc<StubGeocoder>) -> AppState {
        AppState::from_parts(
            Arc::new(InMemoryCache::new()),
            Arc::new(InMemoryNotificationBus::default()),
            geocoder,
        )
    }

    pub fn state() -> AppState {
        state_with(Arc::new(StubGeocoder::default()))
    }
}
