use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named event broadcast to every listener of a topic.
///
/// Topics scope delivery, e.g. `disaster:<id>` for a per-disaster room or
/// `cache` for cache administration events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub topic: String,
    pub event: String,
    pub payload: serde_json::Value,
    pub emitted_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        topic: impl Into<String>,
        event: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            topic: topic.into(),
            event: event.into(),
            payload,
            emitted_at: Utc::now(),
        }
    }
}
