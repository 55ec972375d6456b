//! Geocoding provider implementations.

mod nominatim;

pub use nominatim::{GeocoderConfig, NominatimGeocoder};
