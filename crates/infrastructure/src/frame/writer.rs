use std::net::IpAddr;

use super::{CapturedExchange, FRAME_MAGIC};

/// Frame a captured exchange back into its wire form.
///
/// The retained capture bytes are written verbatim, so encoding a decoded
/// record reproduces the original stream exactly.
pub fn encode_exchange(exchange: &CapturedExchange) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        FRAME_MAGIC.len()
            + 2
            + exchange.family.address_len()
            + 20
            + exchange.query_wire.len()
            + exchange.answer_wire.len(),
    );

    out.extend_from_slice(&FRAME_MAGIC);
    out.push(exchange.family.wire_byte());
    out.push(exchange.transport.wire_byte());
    match exchange.peer {
        IpAddr::V4(addr) => out.extend_from_slice(&addr.octets()),
        IpAddr::V6(addr) => out.extend_from_slice(&addr.octets()),
    }

    out.extend_from_slice(&exchange.query_time.secs.to_be_bytes());
    out.extend_from_slice(&exchange.query_time.nanos.to_be_bytes());
    out.extend_from_slice(&(exchange.query_wire.len() as u16).to_be_bytes());
    out.extend_from_slice(&exchange.query_wire);

    out.extend_from_slice(&exchange.answer_time.secs.to_be_bytes());
    out.extend_from_slice(&exchange.answer_time.nanos.to_be_bytes());
    out.extend_from_slice(&(exchange.answer_wire.len() as u16).to_be_bytes());
    out.extend_from_slice(&exchange.answer_wire);

    out
}
