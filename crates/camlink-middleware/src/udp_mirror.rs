//! Best-effort datagram mirror for full CAM reports.
//!
//! Each report is sent as one UDP datagram with `try_send_to`, so a full
//! socket buffer drops the datagram instead of stalling the event loop.

use std::net::SocketAddr;

use camlink_types::CamError;
use tokio::net::UdpSocket;

/// Fire-and-forget UDP sender bound to an ephemeral local port.
#[derive(Debug)]
pub struct UdpMirror {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpMirror {
    /// Bind an ephemeral socket for sending to `target`.
    pub async fn bind(target: SocketAddr) -> Result<Self, CamError> {
        let local: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| CamError::Transmit(format!("bind {local}: {e}")))?;
        // `try_send_to` only succeeds once the reactor has seen the socket
        // become writable.
        socket
            .writable()
            .await
            .map_err(|e| CamError::Transmit(format!("socket not writable: {e}")))?;
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Send `payload` without waiting.  Errors are returned for the caller
    /// to log or ignore.
    pub fn send(&self, payload: &str) -> Result<(), CamError> {
        self.socket
            .try_send_to(payload.as_bytes(), self.target)
            .map(|_| ())
            .map_err(|e| CamError::Transmit(format!("send to {}: {e}", self.target)))
    }
}
