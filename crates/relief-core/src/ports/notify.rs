//! Notification bus port - topic-scoped broadcast of named events.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::domain::Notification;
use crate::error::NotifyError;

/// Stream of notifications delivered to one subscriber.
pub type NotificationStream = Pin<Box<dyn Stream<Item = Notification> + Send>>;

/// Notification bus - abstraction over pub/sub backends.
#[async_trait]
pub trait NotificationBus: Send + Sync {
    /// Publish to `notification.topic`. Succeeds when nobody is listening.
    async fn publish(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Subscribe to a single topic.
    async fn subscribe(&self, topic: &str) -> Result<NotificationStream, NotifyError>;
}
