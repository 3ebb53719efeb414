//! The pub/sub adapter pattern.
//!
//! The CAM service never speaks directly to a particular broker.  It
//! publishes JSON text through a [`PubSubTransport`] and consumes a merged
//! stream of inbound payloads from every registered transport.  The
//! in-process [`EventBus`] is the built-in implementation; broker-backed
//! transports implement the same trait.

use async_trait::async_trait;
use camlink_types::{BusMessage, CamError};
use futures_util::stream::{self, BoxStream, StreamExt};

use crate::bus::EventBus;

/// Every topic-based transport must implement this trait.
///
/// # Contract
///
/// * `publish` – hand `payload` to the transport for `topic`.  Must not block
///   on network I/O; queueing is fine.
/// * `subscribe` – return a live stream of messages on any of `topics`.  The
///   stream ends when the transport shuts down.
#[async_trait]
pub trait PubSubTransport: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &str;

    /// Publish `payload` on `topic`.
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), CamError>;

    /// Stream inbound messages on any of `topics`.
    async fn subscribe(&self, topics: &[String]) -> BoxStream<'static, BusMessage>;
}

#[async_trait]
impl PubSubTransport for EventBus {
    fn name(&self) -> &str {
        "bus"
    }

    async fn publish(&self, topic: &str, payload: &str) -> Result<(), CamError> {
        EventBus::publish(self, topic, payload).map(|_| ())
    }

    async fn subscribe(&self, topics: &[String]) -> BoxStream<'static, BusMessage> {
        let subscriber = self.subscribe_topics(topics.to_vec());
        stream::unfold(subscriber, |mut sub| async move {
            sub.recv().await.map(|message| (message, sub))
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn bus_as_transport_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::default();
        let transport: Arc<dyn PubSubTransport> = Arc::new(bus.clone());
        assert_eq!(transport.name(), "bus");

        let mut inbound = transport.subscribe(&["in".to_string()]).await;
        transport.publish("out", "ignored").await?;
        transport.publish("in", "wanted").await?;

        let message = inbound.next().await.ok_or("stream ended")?;
        assert_eq!(message.topic, "in");
        assert_eq!(message.payload, "wanted");
        Ok(())
    }

    #[tokio::test]
    async fn stream_ends_when_bus_dropped() {
        let bus = EventBus::default();
        let mut inbound = PubSubTransport::subscribe(&bus, &["in".to_string()]).await;
        drop(bus);
        assert!(inbound.next().await.is_none());
    }
}
