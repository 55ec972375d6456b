//! Redis notification bus. Notifications travel as JSON on a Redis channel
//! named after the topic, so every process sharing the Redis instance sees
//! them.

use async_trait::async_trait;
use futures::StreamExt;
use redis::AsyncCommands;
use redis::Client;
use redis::aio::ConnectionManager;

use relief_core::NotifyError;
use relief_core::domain::Notification;
use relief_core::ports::{NotificationBus, NotificationStream};

use crate::cache::RedisConfig;

pub struct RedisNotificationBus {
    conn: ConnectionManager,
    client: Client,
}

impl RedisNotificationBus {
    pub async fn new(config: RedisConfig) -> Result<Self, NotifyError> {
        let (client, conn) = config
            .connect()
            .await
            .map_err(|e| NotifyError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis notification bus");

        Ok(Self { conn, client })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, NotifyError> {
        Self::new(RedisConfig::from_env()).await
    }
}

#[async_trait]
impl NotificationBus for RedisNotificationBus {
    async fn publish(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = serde_json::to_string(notification)
            .map_err(|e| NotifyError::Publish(e.to_string()))?;

        let mut conn = self.conn.clone();
        conn.publish::<_, _, ()>(notification.topic.as_str(), payload)
            .await
            .map_err(|e| NotifyError::Publish(e.to_string()))
    }

    async fn subscribe(&self, topic: &str) -> Result<NotificationStream, NotifyError> {
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(|e| NotifyError::Connection(e.to_string()))?;

        pubsub
            .subscribe(topic)
            .await
            .map_err(|e| NotifyError::Subscribe(e.to_string()))?;

        tracing::debug!(topic = %topic, "Subscribed to Redis channel");

        let stream = pubsub.into_on_message().filter_map(|msg| async move {
            let payload: String = match msg.get_payload() {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to get message payload");
                    return None;
                }
            };

            match serde_json::from_str::<Notification>(&payload) {
                Ok(notification) => Some(notification),
                Err(e) => {
                    tracing::warn!(
                        channel = %msg.get_channel_name(),
                        error = %e,
                        "Skipping undecodable notification"
                    );
                    None
                }
            }
        });

        Ok(Box::pin(stream))
    }
}
