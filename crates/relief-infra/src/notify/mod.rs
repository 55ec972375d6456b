//! Notification bus implementations.

mod memory;

pub use memory::InMemoryNotificationBus;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::RedisNotificationBus;
