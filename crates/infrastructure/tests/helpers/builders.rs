#![allow(dead_code)]

use std::net::Ipv4Addr;
use std::str::FromStr;

use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA, NS, NULL, SOA};
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};

pub fn name(s: &str) -> Name {
    Name::from_str(s).expect("test name should parse")
}

/// Response skeleton for `qname`/`rtype` with the given rcode and the flag
/// defaults shared by both sides of a comparison.
pub fn response(qname: &str, rtype: RecordType, rcode: ResponseCode) -> Message {
    let mut message = Message::new();
    message.set_id(0x1234);
    message.set_message_type(MessageType::Response);
    message.set_op_code(OpCode::Query);
    message.set_response_code(rcode);
    message.set_recursion_desired(true);

    let mut question = Query::new();
    question.set_name(name(qname));
    question.set_query_type(rtype);
    question.set_query_class(DNSClass::IN);
    message.add_query(question);
    message
}

pub fn query(qname: &str, rtype: RecordType) -> Message {
    let mut message = Message::new();
    message.set_id(0x4321);
    message.set_message_type(MessageType::Query);
    message.set_op_code(OpCode::Query);
    message.set_recursion_desired(true);

    let mut question = Query::new();
    question.set_name(name(qname));
    question.set_query_type(rtype);
    question.set_query_class(DNSClass::IN);
    message.add_query(question);
    message
}

pub fn a_record(owner: &str, ttl: u32, addr: Ipv4Addr) -> Record {
    Record::from_rdata(name(owner), ttl, RData::A(A(addr)))
}

pub fn aaaa_record(owner: &str, ttl: u32, addr: std::net::Ipv6Addr) -> Record {
    Record::from_rdata(name(owner), ttl, RData::AAAA(AAAA(addr)))
}

pub fn ns_record(owner: &str, target: &str) -> Record {
    Record::from_rdata(name(owner), 172800, RData::NS(NS(name(target))))
}

pub fn root_soa(serial: u32) -> Record {
    root_soa_with(serial, 1800, 900, 604800, 86400)
}

pub fn root_soa_with(serial: u32, refresh: i32, retry: i32, expire: i32, minimum: u32) -> Record {
    Record::from_rdata(
        Name::root(),
        86400,
        RData::SOA(SOA::new(
            name("a.root-servers.net."),
            name("nstld.verisign-grs.com."),
            serial,
            refresh,
            retry,
            expire,
            minimum,
        )),
    )
}

/// A record carrying RRSIG's numeric type without the DNSSEC machinery; the
/// comparator classifies by type code.
pub fn rrsig_like(owner: &str) -> Record {
    unknown_record(owner, 46, vec![0xde, 0xad, 0xbe, 0xef])
}

pub fn unknown_record(owner: &str, code: u16, rdata: Vec<u8>) -> Record {
    Record::from_rdata(
        name(owner),
        300,
        RData::Unknown {
            code: RecordType::Unknown(code),
            rdata: NULL::with(rdata),
        },
    )
}
