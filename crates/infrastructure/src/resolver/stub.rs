//! Channel-based stub resolver front-end.
//!
//! Lookups are submitted with [`StubResolver::query`] and collected with
//! [`StubResolver::wait`] or [`StubResolver::wait_by_handle`]; a fixed set
//! of worker tasks drains the submission channel. Answers arriving out of
//! order are buffered until the requested handle shows up.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use rootdiff_domain::ReplayError;
use tokio::sync::{mpsc, Mutex};

use super::exchange;

/// A finished lookup, matched to its submission by handle.
#[derive(Debug)]
pub struct StubAnswer {
    pub handle: u64,
    pub qname: Name,
    pub rtype: RecordType,
    pub response: Option<Message>,
    pub rtt: Duration,
    pub error: Option<ReplayError>,
}

struct StubRequest {
    handle: u64,
    qname: Name,
    rtype: RecordType,
}

pub struct StubResolver {
    next_handle: u64,
    requests: mpsc::UnboundedSender<StubRequest>,
    answers: mpsc::UnboundedReceiver<StubAnswer>,
    finished: Vec<StubAnswer>,
}

impl StubResolver {
    /// Spawn `concurrency` worker tasks resolving against `servers`,
    /// tried in order until one produces an answer.
    pub fn new(
        concurrency: usize,
        servers: Vec<SocketAddr>,
        timeout: Duration,
    ) -> Result<Self, ReplayError> {
        if servers.is_empty() {
            return Err(ReplayError::Config(
                "stub resolver needs at least one server".into(),
            ));
        }

        let (request_tx, request_rx) = mpsc::unbounded_channel::<StubRequest>();
        let (answer_tx, answer_rx) = mpsc::unbounded_channel::<StubAnswer>();

        let shared_rx = Arc::new(Mutex::new(request_rx));
        for _ in 0..concurrency.max(1) {
            let rx = Arc::clone(&shared_rx);
            let tx = answer_tx.clone();
            let servers = servers.clone();
            tokio::spawn(async move {
                loop {
                    let request = { rx.lock().await.recv().await };
                    let Some(request) = request else { break };
                    let answer = resolve_one(&servers, request, timeout).await;
                    if tx.send(answer).is_err() {
                        break;
                    }
                }
            });
        }

        Ok(Self {
            next_handle: 0,
            requests: request_tx,
            answers: answer_rx,
            finished: Vec::new(),
        })
    }

    /// Submit a lookup; the returned handle matches the eventual answer.
    pub fn query(&mut self, qname: Name, rtype: RecordType) -> u64 {
        self.next_handle += 1;
        let handle = self.next_handle;
        let _ = self.requests.send(StubRequest {
            handle,
            qname,
            rtype,
        });
        handle
    }

    /// Next finished answer, buffered ones first.
    pub async fn wait(&mut self) -> Option<StubAnswer> {
        if !self.finished.is_empty() {
            return Some(self.finished.remove(0));
        }
        self.answers.recv().await
    }

    /// The answer for a specific handle, buffering any others that arrive
    /// before it.
    pub async fn wait_by_handle(&mut self, handle: u64) -> Option<StubAnswer> {
        if let Some(pos) = self.finished.iter().position(|a| a.handle == handle) {
            return Some(self.finished.remove(pos));
        }
        while let Some(answer) = self.answers.recv().await {
            if answer.handle == handle {
                return Some(answer);
            }
            self.finished.push(answer);
        }
        None
    }
}

async fn resolve_one(
    servers: &[SocketAddr],
    request: StubRequest,
    timeout: Duration,
) -> StubAnswer {
    let mut message = Message::new();
    message.set_id(0);
    message.set_message_type(MessageType::Query);
    message.set_op_code(OpCode::Query);
    message.set_recursion_desired(true);
    let mut question = Query::new();
    question.set_name(request.qname.clone());
    question.set_query_type(request.rtype);
    question.set_query_class(DNSClass::IN);
    message.add_query(question);

    let mut last_error = None;
    for server in servers {
        match exchange(&message, *server, timeout).await {
            Ok((response, rtt)) => {
                return StubAnswer {
                    handle: request.handle,
                    qname: request.qname,
                    rtype: request.rtype,
                    response: Some(response),
                    rtt,
                    error: None,
                }
            }
            Err(e) => last_error = Some(e),
        }
    }

    StubAnswer {
        handle: request.handle,
        qname: request.qname,
        rtype: request.rtype,
        response: None,
        rtt: Duration::ZERO,
        error: last_error,
    }
}
