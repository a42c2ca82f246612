use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use hickory_proto::op::Message;
use rootdiff_domain::ReplayError;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::warn;

use super::{CaptureTimestamp, CaptureTransport, CapturedExchange, IpFamily, FRAME_MAGIC};

/// Decodes the framed capture stream into [`CapturedExchange`] records.
///
/// End-of-stream at a record boundary ends the sequence cleanly; any short
/// read inside a record, a wrong magic or an invalid family/transport byte
/// is a fatal frame error.
pub struct FrameReader<R> {
    input: R,
}

struct RawRecord {
    family: IpFamily,
    transport: CaptureTransport,
    peer: IpAddr,
    query_time: CaptureTimestamp,
    answer_time: CaptureTimestamp,
    query_wire: Vec<u8>,
    answer_wire: Vec<u8>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Next decodable record, or `None` on clean end of stream.
    ///
    /// A record whose DNS payload the codec rejects is skipped with a
    /// warning; the frame itself was well-formed, so the stream stays
    /// synchronized.
    pub async fn next_exchange(&mut self) -> Result<Option<CapturedExchange>, ReplayError> {
        loop {
            let Some(raw) = self.read_record().await? else {
                return Ok(None);
            };
            let peer = raw.peer;
            match raw.into_exchange() {
                Ok(exchange) => return Ok(Some(exchange)),
                Err(e) => {
                    warn!(error = %e, peer = %peer, "skipping record with undecodable DNS payload")
                }
            }
        }
    }

    async fn read_record(&mut self) -> Result<Option<RawRecord>, ReplayError> {
        if !self.read_magic().await? {
            return Ok(None);
        }

        let family = match self.read_byte("IP family").await? {
            b'4' => IpFamily::V4,
            b'6' => IpFamily::V6,
            other => {
                return Err(ReplayError::FrameFormat(format!(
                    "expecting '4' or '6' for IP family, got {:?}",
                    char::from(other)
                )))
            }
        };

        let transport = match self.read_byte("transport").await? {
            b'u' => CaptureTransport::Udp,
            b't' => CaptureTransport::Tcp,
            other => {
                return Err(ReplayError::FrameFormat(format!(
                    "expecting 'u'dp or 't'cp for transport, got {:?}",
                    char::from(other)
                )))
            }
        };

        let peer = self.read_address(family).await?;
        let query_time = self.read_timestamp("query time").await?;
        let query_wire = self.read_message_bytes("query").await?;
        let answer_time = self.read_timestamp("answer time").await?;
        let answer_wire = self.read_message_bytes("answer").await?;

        Ok(Some(RawRecord {
            family,
            transport,
            peer,
            query_time,
            answer_time,
            query_wire,
            answer_wire,
        }))
    }

    /// True when a magic was consumed, false on clean EOF at the boundary.
    async fn read_magic(&mut self) -> Result<bool, ReplayError> {
        let mut magic = [0u8; 4];
        let first = self
            .input
            .read(&mut magic)
            .await
            .map_err(|e| ReplayError::Io(format!("reading frame magic: {e}")))?;
        if first == 0 {
            return Ok(false);
        }
        self.read_exact(&mut magic[first..], "frame magic").await?;
        if magic != FRAME_MAGIC {
            return Err(ReplayError::FrameFormat(format!(
                "magic {:?} instead of \"ymmv\"",
                String::from_utf8_lossy(&magic)
            )));
        }
        Ok(true)
    }

    async fn read_byte(&mut self, field: &'static str) -> Result<u8, ReplayError> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf, field).await?;
        Ok(buf[0])
    }

    async fn read_u16(&mut self, field: &'static str) -> Result<u16, ReplayError> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf, field).await?;
        Ok(u16::from_be_bytes(buf))
    }

    async fn read_u32(&mut self, field: &'static str) -> Result<u32, ReplayError> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf, field).await?;
        Ok(u32::from_be_bytes(buf))
    }

    async fn read_address(&mut self, family: IpFamily) -> Result<IpAddr, ReplayError> {
        match family {
            IpFamily::V4 => {
                let mut octets = [0u8; 4];
                self.read_exact(&mut octets, "IPv4 address").await?;
                Ok(IpAddr::V4(Ipv4Addr::from(octets)))
            }
            IpFamily::V6 => {
                let mut octets = [0u8; 16];
                self.read_exact(&mut octets, "IPv6 address").await?;
                Ok(IpAddr::V6(Ipv6Addr::from(octets)))
            }
        }
    }

    async fn read_timestamp(
        &mut self,
        field: &'static str,
    ) -> Result<CaptureTimestamp, ReplayError> {
        let secs = self.read_u32(field).await?;
        let nanos = self.read_u32(field).await?;
        Ok(CaptureTimestamp { secs, nanos })
    }

    async fn read_message_bytes(&mut self, field: &'static str) -> Result<Vec<u8>, ReplayError> {
        let len = self.read_u16(field).await? as usize;
        let mut bytes = vec![0u8; len];
        self.read_exact(&mut bytes, field).await?;
        Ok(bytes)
    }

    async fn read_exact(&mut self, buf: &mut [u8], field: &'static str) -> Result<(), ReplayError> {
        match self.input.read_exact(buf).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(ReplayError::FrameFormat(
                format!("stream ended while reading {field}"),
            )),
            Err(e) => Err(ReplayError::Io(format!("reading {field}: {e}"))),
        }
    }
}

impl RawRecord {
    fn into_exchange(self) -> Result<CapturedExchange, ReplayError> {
        let query = Message::from_vec(&self.query_wire)
            .map_err(|e| ReplayError::Protocol(format!("captured query: {e}")))?;
        let answer = Message::from_vec(&self.answer_wire)
            .map_err(|e| ReplayError::Protocol(format!("captured answer: {e}")))?;
        Ok(CapturedExchange {
            family: self.family,
            transport: self.transport,
            peer: self.peer,
            query_time: self.query_time,
            answer_time: self.answer_time,
            query,
            answer,
            query_wire: self.query_wire,
            answer_wire: self.answer_wire,
        })
    }
}
