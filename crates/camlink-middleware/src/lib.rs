//! `camlink-middleware` – plumbing between the CAM facility and the outside
//! world.
//!
//! Routes payloads without caring about their meaning.
//!
//! # Modules
//!
//! - [`bus`] – in-process, topic-based publish/subscribe event bus built on
//!   Tokio broadcast channels.
//! - [`adapter`] – [`PubSubTransport`][adapter::PubSubTransport], the trait
//!   every topic-based transport implements (the bus included).
//! - [`transport`] – the networking-layer seam: `request` / `confirm`,
//!   inbound indications and the queueing [`ChannelTransport`][transport::ChannelTransport].
//! - [`udp_mirror`] – best-effort datagram copy of full CAM reports.
//! - [`metrics`] – Prometheus packet and latency counters.

pub mod adapter;
pub mod bus;
pub mod metrics;
pub mod transport;
pub mod udp_mirror;

pub use adapter::PubSubTransport;
pub use bus::{EventBus, TopicSubscriber};
pub use metrics::CamMetrics;
pub use transport::{
    ChannelTransport, DataConfirm, DataRequest, Indication, OutboundPacket, Transport,
};
pub use udp_mirror::UdpMirror;
