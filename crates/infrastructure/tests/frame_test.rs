//! Frame stream decoding: round-trip fidelity, clean-EOF detection and the
//! fatal deviations.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use hickory_proto::op::ResponseCode;
use hickory_proto::rr::RecordType;
use rootdiff_domain::ReplayError;
use rootdiff_infrastructure::frame::{encode_exchange, FrameReader};

mod helpers;
use helpers::builders::{a_record, query, response};

/// Hand-frame one record the way the capture pipeline does.
fn frame_record(
    family: u8,
    transport: u8,
    addr: &[u8],
    query_wire: &[u8],
    answer_wire: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"ymmv");
    out.push(family);
    out.push(transport);
    out.extend_from_slice(addr);
    out.extend_from_slice(&1712000000u32.to_be_bytes());
    out.extend_from_slice(&500u32.to_be_bytes());
    out.extend_from_slice(&(query_wire.len() as u16).to_be_bytes());
    out.extend_from_slice(query_wire);
    out.extend_from_slice(&1712000001u32.to_be_bytes());
    out.extend_from_slice(&250u32.to_be_bytes());
    out.extend_from_slice(&(answer_wire.len() as u16).to_be_bytes());
    out.extend_from_slice(answer_wire);
    out
}

fn sample_wire_pair() -> (Vec<u8>, Vec<u8>) {
    let query = query("www.example.com.", RecordType::A);
    let mut answer = response("www.example.com.", RecordType::A, ResponseCode::NoError);
    answer.add_answer(a_record(
        "www.example.com.",
        300,
        Ipv4Addr::new(93, 184, 216, 34),
    ));
    (query.to_vec().unwrap(), answer.to_vec().unwrap())
}

#[tokio::test]
async fn test_decode_then_encode_reproduces_the_stream() {
    let (query_wire, answer_wire) = sample_wire_pair();
    let mut stream = frame_record(b'4', b'u', &[192, 0, 2, 7], &query_wire, &answer_wire);
    stream.extend_from_slice(&frame_record(
        b'6',
        b't',
        &Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1).octets(),
        &query_wire,
        &answer_wire,
    ));

    let mut reader = FrameReader::new(stream.as_slice());
    let first = reader.next_exchange().await.unwrap().expect("first record");
    let second = reader.next_exchange().await.unwrap().expect("second record");
    assert!(reader.next_exchange().await.unwrap().is_none(), "clean EOF");

    let mut re_encoded = encode_exchange(&first);
    re_encoded.extend_from_slice(&encode_exchange(&second));
    assert_eq!(re_encoded, stream, "round trip must be byte-identical");
}

#[tokio::test]
async fn test_decoded_fields() {
    let (query_wire, answer_wire) = sample_wire_pair();
    let stream = frame_record(b'4', b'u', &[192, 0, 2, 7], &query_wire, &answer_wire);

    let mut reader = FrameReader::new(stream.as_slice());
    let exchange = reader.next_exchange().await.unwrap().unwrap();

    assert_eq!(exchange.peer, IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7)));
    assert_eq!(exchange.query_time.secs, 1712000000);
    assert_eq!(exchange.query_time.nanos, 500);
    assert_eq!(exchange.answer_time.secs, 1712000001);
    assert!(!exchange.query_time.is_unknown());
    assert_eq!(exchange.query.queries().len(), 1);
    assert_eq!(exchange.answer.answers().len(), 1);
    assert_eq!(
        exchange.answer.response_code(),
        ResponseCode::NoError
    );
}

#[tokio::test]
async fn test_unknown_timestamps_decode_as_sentinel() {
    let (query_wire, answer_wire) = sample_wire_pair();
    let mut stream = Vec::new();
    stream.extend_from_slice(b"ymmv");
    stream.push(b'4');
    stream.push(b'u');
    stream.extend_from_slice(&[192, 0, 2, 7]);
    stream.extend_from_slice(&[0u8; 8]); // query time unknown
    stream.extend_from_slice(&(query_wire.len() as u16).to_be_bytes());
    stream.extend_from_slice(&query_wire);
    stream.extend_from_slice(&[0u8; 8]); // answer time unknown
    stream.extend_from_slice(&(answer_wire.len() as u16).to_be_bytes());
    stream.extend_from_slice(&answer_wire);

    let mut reader = FrameReader::new(stream.as_slice());
    let exchange = reader.next_exchange().await.unwrap().unwrap();
    assert!(exchange.query_time.is_unknown());
    assert!(exchange.answer_time.is_unknown());
}

#[tokio::test]
async fn test_empty_stream_is_clean_eof() {
    let mut reader = FrameReader::new(&[][..]);
    assert!(reader.next_exchange().await.unwrap().is_none());
}

#[tokio::test]
async fn test_wrong_magic_is_a_frame_error() {
    let mut reader = FrameReader::new(&b"xmmv"[..]);
    let err = reader.next_exchange().await.unwrap_err();
    assert!(matches!(err, ReplayError::FrameFormat(_)), "got: {err}");
}

#[tokio::test]
async fn test_truncated_record_is_a_frame_error() {
    // magic and family present, then the stream dies
    let mut reader = FrameReader::new(&b"ymmv4"[..]);
    let err = reader.next_exchange().await.unwrap_err();
    assert!(matches!(err, ReplayError::FrameFormat(_)), "got: {err}");
}

#[tokio::test]
async fn test_invalid_family_byte_is_a_frame_error() {
    let (query_wire, answer_wire) = sample_wire_pair();
    let stream = frame_record(b'5', b'u', &[192, 0, 2, 7], &query_wire, &answer_wire);
    let mut reader = FrameReader::new(stream.as_slice());
    let err = reader.next_exchange().await.unwrap_err();
    assert!(matches!(err, ReplayError::FrameFormat(_)), "got: {err}");
}

#[tokio::test]
async fn test_invalid_transport_byte_is_a_frame_error() {
    let (query_wire, answer_wire) = sample_wire_pair();
    let stream = frame_record(b'4', b'x', &[192, 0, 2, 7], &query_wire, &answer_wire);
    let mut reader = FrameReader::new(stream.as_slice());
    let err = reader.next_exchange().await.unwrap_err();
    assert!(matches!(err, ReplayError::FrameFormat(_)), "got: {err}");
}

#[tokio::test]
async fn test_record_with_garbage_dns_payload_is_skipped() {
    let (query_wire, answer_wire) = sample_wire_pair();
    let mut stream = frame_record(b'4', b'u', &[192, 0, 2, 7], &[0xde, 0xad], &answer_wire);
    stream.extend_from_slice(&frame_record(
        b'4',
        b'u',
        &[192, 0, 2, 8],
        &query_wire,
        &answer_wire,
    ));

    let mut reader = FrameReader::new(stream.as_slice());
    let exchange = reader
        .next_exchange()
        .await
        .unwrap()
        .expect("the good record after the skipped one");
    assert_eq!(exchange.peer, IpAddr::V4(Ipv4Addr::new(192, 0, 2, 8)));
    assert!(reader.next_exchange().await.unwrap().is_none());
}
