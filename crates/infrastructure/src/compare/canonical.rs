//! Canonical record ordering and textual forms.
//!
//! RRsets only compare reliably once both sides are in one deterministic
//! order, and the textual form has to respect which record types carry
//! case-insensitive names in their RDATA.

use std::cmp::Ordering;

use hickory_proto::op::{OpCode, ResponseCode};
use hickory_proto::rr::{Record, RecordType};

/// Record types whose RDATA contains names that compare case-insensitively
/// under DNS rules.
fn rdata_case_insensitive(rtype: RecordType) -> bool {
    matches!(
        rtype,
        RecordType::NS
            | RecordType::CNAME
            | RecordType::SOA
            | RecordType::PTR
            | RecordType::MX
            | RecordType::SRV
            | RecordType::NAPTR
    )
}

/// Presentation text used when records are ordered and reported; lowercased
/// for the types whose RDATA is case-insensitive, case-preserving otherwise.
pub fn canonical_text(record: &Record) -> String {
    let text = record.to_string();
    if rdata_case_insensitive(record.record_type()) {
        text.to_ascii_lowercase()
    } else {
        text
    }
}

/// Match key for Answer/Authority set difference: the full presentation
/// text, case-insensitively.
pub(crate) fn matching_key(record: &Record) -> String {
    record.to_string().to_ascii_lowercase()
}

/// Ordering for presentation and RRset comparison: lowercased owner name,
/// numeric type, TTL, canonical text. Class is not considered.
pub fn canonical_cmp(a: &Record, b: &Record) -> Ordering {
    let a_owner = a.name().to_utf8().to_ascii_lowercase();
    let b_owner = b.name().to_utf8().to_ascii_lowercase();
    a_owner
        .cmp(&b_owner)
        .then_with(|| u16::from(a.record_type()).cmp(&u16::from(b.record_type())))
        .then_with(|| a.ttl().cmp(&b.ttl()))
        .then_with(|| canonical_text(a).cmp(&canonical_text(b)))
}

/// Type checks by numeric code, so records the codec surfaced as unknown
/// rdata still classify correctly.
pub(crate) fn has_type(record: &Record, rtype: RecordType) -> bool {
    u16::from(record.record_type()) == u16::from(rtype)
}

pub(crate) fn opcode_to_str(opcode: OpCode) -> &'static str {
    match opcode {
        OpCode::Query => "QUERY",
        OpCode::Status => "STATUS",
        OpCode::Notify => "NOTIFY",
        OpCode::Update => "UPDATE",
        _ => "UNKNOWN",
    }
}

pub(crate) fn rcode_to_str(rcode: ResponseCode) -> &'static str {
    match rcode {
        ResponseCode::NoError => "NOERROR",
        ResponseCode::FormErr => "FORMERR",
        ResponseCode::ServFail => "SERVFAIL",
        ResponseCode::NXDomain => "NXDOMAIN",
        ResponseCode::NotImp => "NOTIMP",
        ResponseCode::Refused => "REFUSED",
        ResponseCode::YXDomain => "YXDOMAIN",
        ResponseCode::YXRRSet => "YXRRSET",
        ResponseCode::NXRRSet => "NXRRSET",
        ResponseCode::NotAuth => "NOTAUTH",
        ResponseCode::NotZone => "NOTZONE",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::rr::rdata::{A, NS};
    use hickory_proto::rr::{Name, RData};
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    fn a_record(owner: &str, ttl: u32, last_octet: u8) -> Record {
        Record::from_rdata(
            Name::from_str(owner).unwrap(),
            ttl,
            RData::A(A(Ipv4Addr::new(192, 0, 2, last_octet))),
        )
    }

    fn ns_record(owner: &str, target: &str) -> Record {
        Record::from_rdata(
            Name::from_str(owner).unwrap(),
            3600,
            RData::NS(NS(Name::from_str(target).unwrap())),
        )
    }

    #[test]
    fn test_canonical_text_lowercases_ns_rdata() {
        let record = ns_record("example.com.", "NS1.Example.COM.");
        let text = canonical_text(&record);
        assert_eq!(text, text.to_ascii_lowercase());
        assert!(text.contains("ns1.example.com."));
    }

    #[test]
    fn test_canonical_text_preserves_case_sensitive_rdata() {
        use hickory_proto::rr::rdata::TXT;
        let record = Record::from_rdata(
            Name::from_str("example.com.").unwrap(),
            60,
            RData::TXT(TXT::new(vec!["MixedCase".to_string()])),
        );
        assert!(canonical_text(&record).contains("MixedCase"));
    }

    #[test]
    fn test_canonical_cmp_orders_by_owner_then_type_then_ttl() {
        let a = a_record("a.example.com.", 60, 1);
        let b = a_record("b.example.com.", 60, 1);
        assert_eq!(canonical_cmp(&a, &b), Ordering::Less);

        let ns = ns_record("a.example.com.", "ns.example.com.");
        // A (1) sorts before NS (2)
        assert_eq!(canonical_cmp(&a, &ns), Ordering::Less);

        let short = a_record("a.example.com.", 30, 1);
        assert_eq!(canonical_cmp(&short, &a), Ordering::Less);
    }

    #[test]
    fn test_canonical_cmp_owner_names_compare_case_insensitively() {
        let lower = a_record("zz.example.com.", 60, 1);
        let upper = a_record("AA.EXAMPLE.COM.", 60, 1);
        // 'aa' < 'zz' regardless of the original casing
        assert_eq!(canonical_cmp(&upper, &lower), Ordering::Less);
    }

    #[test]
    fn test_rcode_and_opcode_tokens() {
        assert_eq!(rcode_to_str(ResponseCode::NoError), "NOERROR");
        assert_eq!(rcode_to_str(ResponseCode::ServFail), "SERVFAIL");
        assert_eq!(rcode_to_str(ResponseCode::NXDomain), "NXDOMAIN");
        assert_eq!(opcode_to_str(OpCode::Query), "QUERY");
    }
}
