use async_trait::async_trait;

use crate::domain::Coordinates;
use crate::error::GeocodeError;

/// Place-name geocoder - abstraction over third-party geocoding APIs.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a place name. `Ok(None)` means the provider found nothing.
    async fn geocode(&self, location: &str) -> Result<Option<Coordinates>, GeocodeError>;
}
