#![allow(dead_code)]

use std::net::SocketAddr;

use hickory_proto::op::Message;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};

/// Mock shadow server answering every query with one canned message.
///
/// The UDP side can be told to truncate, which sends the resolver down its
/// TCP fallback path; the TCP side always serves the full answer. Both
/// sockets share the same port. Tasks die with the test runtime.
pub struct MockShadowServer {
    pub addr: SocketAddr,
}

impl MockShadowServer {
    pub async fn start(answer: Message, truncate_udp: bool) -> MockShadowServer {
        let udp = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("bind mock UDP socket");
        let addr = udp.local_addr().expect("mock socket has a local addr");
        let tcp = TcpListener::bind(addr).await.expect("bind mock TCP socket");

        let udp_answer = answer.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 65535];
            loop {
                let Ok((len, peer)) = udp.recv_from(&mut buf).await else {
                    break;
                };
                if len < 2 {
                    continue;
                }
                let id = u16::from_be_bytes([buf[0], buf[1]]);
                let mut reply = udp_answer.clone();
                reply.set_id(id);
                if truncate_udp {
                    reply.set_truncated(true);
                }
                if let Ok(bytes) = reply.to_vec() {
                    let _ = udp.send_to(&bytes, peer).await;
                }
            }
        });

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = tcp.accept().await else {
                    break;
                };
                let answer = answer.clone();
                tokio::spawn(async move {
                    let mut len_buf = [0u8; 2];
                    if stream.read_exact(&mut len_buf).await.is_err() {
                        return;
                    }
                    let len = u16::from_be_bytes(len_buf) as usize;
                    let mut query = vec![0u8; len];
                    if stream.read_exact(&mut query).await.is_err() {
                        return;
                    }
                    if query.len() < 2 {
                        return;
                    }
                    let id = u16::from_be_bytes([query[0], query[1]]);
                    let mut reply = answer;
                    reply.set_id(id);
                    if let Ok(bytes) = reply.to_vec() {
                        let _ = stream
                            .write_all(&(bytes.len() as u16).to_be_bytes())
                            .await;
                        let _ = stream.write_all(&bytes).await;
                        let _ = stream.flush().await;
                    }
                });
            }
        });

        MockShadowServer { addr }
    }
}
