//! In-memory notification bus.
//!
//! Works within a single process only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};

use relief_core::NotifyError;
use relief_core::domain::Notification;
use relief_core::ports::{NotificationBus, NotificationStream};

type Topics = Arc<RwLock<HashMap<String, broadcast::Sender<Notification>>>>;

/// One broadcast channel per topic. A topic is dropped once its last
/// subscriber goes away.
pub struct InMemoryNotificationBus {
    topics: Topics,
    buffer_size: usize,
}

impl InMemoryNotificationBus {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Number of topics with at least one live subscriber, or whose last
    /// subscriber left while the map was busy.
    pub async fn topic_count(&self) -> usize {
        self.topics.read().await.len()
    }
}

impl Default for InMemoryNotificationBus {
    fn default() -> Self {
        Self::new(100)
    }
}

/// One subscriber's receiver; unregisters the topic when it is the last.
struct Subscription {
    receiver: Option<broadcast::Receiver<Notification>>,
    topic: String,
    topics: Topics,
}

impl Subscription {
    async fn next(&mut self) -> Option<Notification> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    tracing::warn!(topic = %self.topic, lagged = count, "Subscriber lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(topic = %self.topic, "Topic closed");
                    return None;
                }
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.receiver.take();

        // Contention leaves the entry for the next publish or subscribe to prune.
        if let Ok(mut topics) = self.topics.try_write() {
            remove_if_idle(&mut topics, &self.topic);
        }
    }
}

fn remove_if_idle(topics: &mut HashMap<String, broadcast::Sender<Notification>>, topic: &str) {
    if topics.get(topic).is_some_and(|s| s.receiver_count() == 0) {
        topics.remove(topic);
        tracing::debug!(topic = %topic, "Topic released");
    }
}

#[async_trait]
impl NotificationBus for InMemoryNotificationBus {
    async fn publish(&self, notification: &Notification) -> Result<(), NotifyError> {
        let delivered = {
            let topics = self.topics.read().await;
            match topics.get(&notification.topic) {
                // A send error only means every receiver has gone away.
                Some(sender) => sender.send(notification.clone()).ok(),
                None => {
                    tracing::debug!(topic = %notification.topic, "No subscribers for topic");
                    return Ok(());
                }
            }
        };

        match delivered {
            Some(receivers) => tracing::debug!(
                topic = %notification.topic,
                event = %notification.event,
                receivers,
                "Notification published"
            ),
            None => {
                tracing::debug!(topic = %notification.topic, "No live subscribers");
                remove_if_idle(&mut *self.topics.write().await, &notification.topic);
            }
        }

        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<NotificationStream, NotifyError> {
        let receiver = {
            let mut topics = self.topics.write().await;
            topics.retain(|_, sender| sender.receiver_count() > 0);
            topics
                .entry(topic.to_string())
                .or_insert_with(|| broadcast::channel(self.buffer_size).0)
                .subscribe()
        };
        tracing::info!(topic = %topic, "Subscribed to topic");

        let subscription = Subscription {
            receiver: Some(receiver),
            topic: topic.to_string(),
            topics: self.topics.clone(),
        };

        let stream = futures::stream::unfold(subscription, |mut sub| async move {
            let notification = sub.next().await?;
            Some((notification, sub))
        });

        Ok(Box::pin(stream))
    }
}
