//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod cache;
mod clock;
mod geocoder;
mod notify;

pub use cache::KeyValueCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use geocoder::Geocoder;
pub use notify::{NotificationBus, NotificationStream};
