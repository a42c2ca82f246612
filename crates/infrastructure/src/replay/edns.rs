use hickory_proto::op::{Edns, Message};

/// Force the advertised EDNS0 UDP payload size on a replayed query.
///
/// An existing OPT record keeps its other fields; a query without EDNS gains
/// a fresh OPT with DO=0. A size of zero leaves the query untouched.
pub fn force_udp_size(message: &mut Message, size: u16) {
    if size == 0 {
        return;
    }
    let extensions = message.extensions_mut();
    match extensions {
        Some(edns) => {
            edns.set_max_payload(size);
        }
        None => {
            let mut edns = Edns::new();
            edns.set_max_payload(size);
            edns.set_dnssec_ok(false);
            edns.set_version(0);
            *extensions = Some(edns);
        }
    }
}
