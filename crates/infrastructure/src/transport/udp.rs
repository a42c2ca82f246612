//! UDP transport for replayed queries (RFC 1035 §4.2.1).
//!
//! Messages go out as-is, no framing. A response with the TC bit set is the
//! resolver's cue to retry the exchange over TCP.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use rootdiff_domain::ReplayError;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

use super::{classify_io, timeout_error, DnsTransport, TransportResponse};

/// Largest response we accept over UDP; replayed queries never advertise a
/// bigger EDNS payload size.
const MAX_UDP_RESPONSE_SIZE: usize = 65535;

pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, ReplayError> {
        // Bind to ephemeral port (0 = OS assigns)
        let bind_addr: SocketAddr = if self.server_addr.is_ipv4() {
            "0.0.0.0:0".parse().unwrap()
        } else {
            "[::]:0".parse().unwrap()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| ReplayError::Network(format!("binding UDP socket: {e}")))?;

        tokio::time::timeout(timeout, socket.send_to(message_bytes, self.server_addr))
            .await
            .map_err(|_| timeout_error(self.server_addr))?
            .map_err(|e| classify_io(self.server_addr, e))?;

        debug!(
            server = %self.server_addr,
            bytes_sent = message_bytes.len(),
            "UDP query sent"
        );

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let (bytes_received, from_addr) =
            tokio::time::timeout(timeout, socket.recv_from(&mut recv_buf))
                .await
                .map_err(|_| timeout_error(self.server_addr))?
                .map_err(|e| classify_io(self.server_addr, e))?;

        if from_addr.ip() != self.server_addr.ip() {
            warn!(
                expected = %self.server_addr,
                received_from = %from_addr,
                "UDP response from unexpected source"
            );
        }

        recv_buf.truncate(bytes_received);

        debug!(
            server = %self.server_addr,
            bytes_received,
            "UDP response received"
        );

        Ok(TransportResponse { bytes: recv_buf })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
