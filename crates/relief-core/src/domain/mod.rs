//! Domain types shared by ports and adapters.

mod cache;
mod geo;
mod notification;

pub use cache::{CacheEntry, CacheKey, Ttl, is_expired};
pub use geo::Coordinates;
pub use notification::Notification;
