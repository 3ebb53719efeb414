//! Headless, topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] under the hood so that every subscriber
//! receives every message without any single subscriber blocking the others.
//! Topics are plain strings; a [`TopicSubscriber`] filters the shared
//! channel down to the topics it was created for.

use camlink_types::{BusMessage, CamError};
use tokio::sync::broadcast;
use tracing::warn;

/// Default channel capacity (number of buffered messages before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Shared in-process bus. Clone it cheaply – all clones share the same
/// underlying broadcast channel.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<BusMessage>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish `payload` on `topic`.
    ///
    /// Returns the number of active receivers that were handed the message.
    /// `Ok(0)` when nobody is listening is a normal condition.
    pub fn publish(&self, topic: &str, payload: impl Into<String>) -> Result<usize, CamError> {
        self.publish_message(BusMessage::new(topic, payload))
    }

    /// Publish a pre-built [`BusMessage`].
    pub fn publish_message(&self, message: BusMessage) -> Result<usize, CamError> {
        if self.sender.receiver_count() == 0 {
            return Ok(0);
        }
        self.sender
            .send(message)
            .map_err(|e| CamError::Channel(format!("event bus send error: {e}")))
    }

    /// Subscribe to every message on the bus.
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.sender.subscribe()
    }

    /// Subscribe to a single topic.
    pub fn subscribe_topic(&self, topic: impl Into<String>) -> TopicSubscriber {
        self.subscribe_topics(vec![topic.into()])
    }

    /// Subscribe to any of `topics`.
    pub fn subscribe_topics(&self, topics: Vec<String>) -> TopicSubscriber {
        TopicSubscriber {
            topics,
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Topic subscriber
// ---------------------------------------------------------------------------

/// A subscriber that only delivers messages whose topic is one of the topics
/// it was created with.
pub struct TopicSubscriber {
    topics: Vec<String>,
    receiver: broadcast::Receiver<BusMessage>,
}

impl TopicSubscriber {
    /// Wait for the next message matching this subscriber's topics.
    ///
    /// Returns `None` when the bus is closed and no further messages will
    /// arrive.
    pub async fn recv(&mut self) -> Option<BusMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) if self.topics.iter().any(|t| *t == message.topic) => {
                    return Some(message);
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(topics = ?self.topics, lagged_by = n, "TopicSubscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }
}
