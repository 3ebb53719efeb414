//! Transport-layer seam: outbound data requests and inbound indications.
//!
//! The facility hands each outbound [`AwarenessMessage`] to a [`Transport`]
//! together with a [`DataRequest`] describing how it must be sent.  The
//! transport only queues; it answers synchronously with a [`DataConfirm`].
//! [`ChannelTransport`] is the queueing implementation used by the daemon
//! and in tests: accepted packets land on a bounded `mpsc` channel that the
//! networking layer drains.

use camlink_types::AwarenessMessage;
use tokio::sync::mpsc;
use tracing::debug;

/// ITS application identifier of the cooperative awareness basic service.
pub const ITS_AID_CA: u32 = 36;

/// Packet transport type requested from the networking layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportType {
    SingleHopBroadcast,
}

/// Access-layer communication profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommunicationProfile {
    ItsG5,
}

/// Parameters accompanying every outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRequest {
    pub its_aid: u32,
    pub transport_type: TransportType,
    pub communication_profile: CommunicationProfile,
}

impl DataRequest {
    /// Single-hop broadcast over ITS-G5 with the CA application id.
    pub fn cam() -> Self {
        Self {
            its_aid: ITS_AID_CA,
            transport_type: TransportType::SingleHopBroadcast,
            communication_profile: CommunicationProfile::ItsG5,
        }
    }
}

/// Answer of the transport to a [`DataRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataConfirm {
    pub accepted: bool,
}

impl DataConfirm {
    pub fn accepted() -> Self {
        Self { accepted: true }
    }

    pub fn rejected() -> Self {
        Self { accepted: false }
    }
}

/// The networking layer below the facility.
pub trait Transport: Send + Sync {
    /// Queue `message` for transmission.  Must not block.
    fn request(&self, request: &DataRequest, message: &AwarenessMessage) -> DataConfirm;
}

/// A message received from the networking layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Indication {
    /// `None` when the payload could not be decoded.
    pub message: Option<AwarenessMessage>,
    /// Reception time in seconds since the Unix epoch.
    pub reception_time: f64,
    /// Received signal strength (dBm).
    pub rssi: i32,
}

// ────────────────────────────────────────────────────────────────────────────
// ChannelTransport
// ────────────────────────────────────────────────────────────────────────────

/// One accepted outbound packet.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundPacket {
    pub request: DataRequest,
    pub message: AwarenessMessage,
}

/// [`Transport`] that queues packets on a bounded channel.
///
/// A full or closed queue rejects the request.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::Sender<OutboundPacket>,
}

impl ChannelTransport {
    /// Create a transport and the receiving end of its queue.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<OutboundPacket>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl Transport for ChannelTransport {
    fn request(&self, request: &DataRequest, message: &AwarenessMessage) -> DataConfirm {
        let packet = OutboundPacket {
            request: *request,
            message: message.clone(),
        };
        match self.sender.try_send(packet) {
            Ok(()) => DataConfirm::accepted(),
            Err(e) => {
                debug!(error = %e, "transport queue refused packet");
                DataConfirm::rejected()
            }
        }
    }
}
