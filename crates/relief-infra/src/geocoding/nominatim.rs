//! Nominatim (OpenStreetMap) geocoder.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;

use relief_core::GeocodeError;
use relief_core::domain::Coordinates;
use relief_core::ports::Geocoder;

/// Geocoder configuration.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Outbound request budget. Nominatim's public policy is one per second.
    pub requests_per_second: NonZeroU32,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("relief-coordination/", env!("CARGO_PKG_VERSION")).to_string(),
            requests_per_second: NonZeroU32::MIN,
            timeout: Duration::from_secs(10),
        }
    }
}

impl GeocoderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("GEOCODER_BASE_URL").unwrap_or(defaults.base_url),
            user_agent: std::env::var("GEOCODER_USER_AGENT").unwrap_or(defaults.user_agent),
            requests_per_second: std::env::var("GEOCODER_REQUESTS_PER_SECOND")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.requests_per_second),
            timeout: defaults.timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
}

/// Throttled Nominatim client.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    limiter: DefaultDirectRateLimiter,
    search_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeocodeError::Provider(e.to_string()))?;

        Ok(Self {
            client,
            limiter: RateLimiter::direct(Quota::per_second(config.requests_per_second)),
            search_url: format!("{}/search", config.base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, location: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.limiter.until_ready().await;

        tracing::debug!(location = %location, "Calling Nominatim");

        let hits: Vec<NominatimHit> = self
            .client
            .get(&self.search_url)
            .query(&[("q", location), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| GeocodeError::Provider(e.to_string()))?
            .json()
            .await
            .map_err(|e| GeocodeError::Provider(e.to_string()))?;

        first_hit(hits)
    }
}

fn first_hit(hits: Vec<NominatimHit>) -> Result<Option<Coordinates>, GeocodeError> {
    let Some(hit) = hits.into_iter().next() else {
        return Ok(None);
    };

    let lat = hit
        .lat
        .parse::<f64>()
        .map_err(|e| GeocodeError::Provider(format!("invalid latitude {:?}: {e}", hit.lat)))?;
    let lng = hit
        .lon
        .parse::<f64>()
        .map_err(|e| GeocodeError::Provider(format!("invalid longitude {:?}: {e}", hit.lon)))?;

    Ok(Some(Coordinates::new(lat, lng)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<Option<Coordinates>, GeocodeError> {
        first_hit(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn test_first_hit_parsed() {
        let body = r#"[
            {"lat": "40.7831", "lon": "-73.9712", "display_name": "Manhattan, New York"},
            {"lat": "0", "lon": "0", "display_name": "elsewhere"}
        ]"#;
        assert_eq!(parse(body).unwrap(), Some(Coordinates::new(40.7831, -73.9712)));
    }

    #[test]
    fn test_no_hits_is_none() {
        assert_eq!(parse("[]").unwrap(), None);
    }

    #[test]
    fn test_bad_coordinate_is_provider_error() {
        let body = r#"[{"lat": "north", "lon": "-73.97"}]"#;
        assert!(matches!(parse(body), Err(GeocodeError::Provider(_))));
    }

    #[test]
    fn test_search_url_trims_slash() {
        let geocoder = NominatimGeocoder::new(GeocoderConfig {
            base_url: "http://localhost:8088/".to_string(),
            ..GeocoderConfig::default()
        })
        .unwrap();
        assert_eq!(geocoder.search_url, "http://localhost:8088/search");
    }
}
