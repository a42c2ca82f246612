//! Framed capture stream: concatenated `(query, answer)` records with
//! capture metadata, produced by the capture pipeline and consumed here.
//!
//! Record layout (multi-byte integers big-endian):
//! magic `ymmv` (4) | family `'4'|'6'` (1) | transport `'u'|'t'` (1) |
//! address (4 or 16) | query sec/nsec (4+4) | query len (2) | query bytes |
//! answer sec/nsec (4+4) | answer len (2) | answer bytes.

mod reader;
mod writer;

pub use reader::FrameReader;
pub use writer::encode_exchange;

use std::fmt::Write as _;
use std::net::IpAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hickory_proto::op::Message;

pub const FRAME_MAGIC: [u8; 4] = *b"ymmv";

const DUMP_WIDTH: usize = 78;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    pub fn wire_byte(self) -> u8 {
        match self {
            Self::V4 => b'4',
            Self::V6 => b'6',
        }
    }

    pub fn address_len(self) -> usize {
        match self {
            Self::V4 => 4,
            Self::V6 => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTransport {
    Udp,
    Tcp,
}

impl CaptureTransport {
    pub fn wire_byte(self) -> u8 {
        match self {
            Self::Udp => b'u',
            Self::Tcp => b't',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Udp => "UDP",
            Self::Tcp => "TCP",
        }
    }
}

/// Capture wall-clock time; all-zero means the capture tool did not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTimestamp {
    pub secs: u32,
    pub nanos: u32,
}

impl CaptureTimestamp {
    pub const UNKNOWN: Self = Self { secs: 0, nanos: 0 };

    pub fn is_unknown(&self) -> bool {
        self.secs == 0 && self.nanos == 0
    }

    pub fn to_system_time(&self) -> Option<SystemTime> {
        if self.is_unknown() {
            return None;
        }
        Some(UNIX_EPOCH + Duration::new(u64::from(self.secs), self.nanos))
    }
}

/// One captured query/answer pair, decoded from the frame stream and
/// consumed exactly once by the replay orchestrator.
#[derive(Debug, Clone)]
pub struct CapturedExchange {
    pub family: IpFamily,
    pub transport: CaptureTransport,
    /// Address the capture tool observed the exchange against.
    pub peer: IpAddr,
    pub query_time: CaptureTimestamp,
    pub answer_time: CaptureTimestamp,
    pub query: Message,
    pub answer: Message,
    /// Captured wire bytes, kept verbatim so re-framing a decoded record
    /// reproduces the input byte-for-byte.
    pub query_wire: Vec<u8>,
    pub answer_wire: Vec<u8>,
}

impl CapturedExchange {
    /// Human-readable dump of the whole exchange, one framed block.
    pub fn render_dump(&self) -> String {
        let family = match self.family {
            IpFamily::V4 => 4,
            IpFamily::V6 => 6,
        };
        let header = format!(
            "===[ captured exchange (IPv{}, {}, {}) ]",
            family,
            self.transport.label(),
            self.peer
        );

        let mut out = String::new();
        let _ = writeln!(out, "{}", pad_right(&header, DUMP_WIDTH, '='));
        let _ = writeln!(out, "{}", self.query);
        let _ = writeln!(out, ";; WHEN: {}", render_when(&self.query_time));
        let _ = writeln!(out, "{}", pad_right("", DUMP_WIDTH, '-'));
        let _ = writeln!(out, "{}", self.answer);
        let _ = writeln!(out, ";; WHEN: {}", render_when(&self.answer_time));
        let _ = writeln!(out, "{}", pad_right("", DUMP_WIDTH, '-'));
        out
    }
}

fn render_when(time: &CaptureTimestamp) -> String {
    if time.is_unknown() {
        "unknown".to_string()
    } else {
        format!("{}.{:09}", time.secs, time.nanos)
    }
}

fn pad_right(s: &str, width: usize, pad: char) -> String {
    let mut out = s.to_string();
    while out.len() < width {
        out.push(pad);
    }
    out
}
