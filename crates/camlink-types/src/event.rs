//! Envelope for payloads routed over a pub/sub transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One published payload, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Topic name, e.g. `"vanetza/in/cam"`.
    pub topic: String,
    /// JSON text.
    pub payload: String,
}

impl BusMessage {
    /// Stamp a new message with a fresh id and the current wall-clock time.
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}
