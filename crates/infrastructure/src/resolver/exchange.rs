use std::net::SocketAddr;
use std::time::{Duration, Instant};

use hickory_proto::op::Message;
use rootdiff_domain::ReplayError;
use tracing::debug;

use crate::transport::{DnsTransport, TcpTransport, UdpTransport};

/// Minimum budget left for the TCP retry after a truncated UDP answer.
const TCP_RETRY_FLOOR: Duration = Duration::from_millis(500);

/// Execute one DNS query against a single shadow server.
///
/// UDP first; a truncated response (TC=1) is retried over TCP with the
/// remaining timeout budget. Every attempt carries a fresh random 16-bit
/// message ID. Returns the parsed response and the measured round-trip time.
pub async fn exchange(
    query: &Message,
    server: SocketAddr,
    timeout: Duration,
) -> Result<(Message, Duration), ReplayError> {
    let start = Instant::now();
    let mut attempt = query.clone();

    attempt.set_id(fastrand::u16(..));
    let wire = serialize(&attempt)?;
    let udp = UdpTransport::new(server);
    let response = udp.send(&wire, timeout).await?;
    let message = parse(&response.bytes, server)?;

    if !message.truncated() {
        return Ok((message, start.elapsed()));
    }

    debug!(server = %server, "response truncated, retrying over TCP");
    attempt.set_id(fastrand::u16(..));
    let wire = serialize(&attempt)?;
    let remaining = timeout
        .checked_sub(start.elapsed())
        .unwrap_or(TCP_RETRY_FLOOR);
    let tcp = TcpTransport::new(server);
    let response = tcp.send(&wire, remaining).await?;
    let message = parse(&response.bytes, server)?;

    Ok((message, start.elapsed()))
}

fn serialize(message: &Message) -> Result<Vec<u8>, ReplayError> {
    message
        .to_vec()
        .map_err(|e| ReplayError::Protocol(format!("serializing query: {e}")))
}

fn parse(bytes: &[u8], server: SocketAddr) -> Result<Message, ReplayError> {
    Message::from_vec(bytes)
        .map_err(|e| ReplayError::Protocol(format!("parsing response from {server}: {e}")))
}
