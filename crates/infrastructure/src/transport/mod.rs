pub mod tcp;
pub mod udp;

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use rootdiff_domain::ReplayError;

pub use tcp::TcpTransport;
pub use udp::UdpTransport;

/// Raw DNS message bytes received from a shadow server.
#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, ReplayError>;

    fn protocol_name(&self) -> &'static str;
}

pub(crate) fn classify_io(server: SocketAddr, err: io::Error) -> ReplayError {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => ReplayError::TransportConnectionRefused {
            server: server.to_string(),
        },
        io::ErrorKind::ConnectionReset => ReplayError::TransportConnectionReset {
            server: server.to_string(),
        },
        _ => ReplayError::Network(format!("{server}: {err}")),
    }
}

pub(crate) fn timeout_error(server: SocketAddr) -> ReplayError {
    ReplayError::TransportTimeout {
        server: server.to_string(),
    }
}
