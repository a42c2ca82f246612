//! Replay fan-out: one task per captured record, reports collected on a
//! channel and written to stdout in completion order, each as one
//! contiguous block.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hickory_proto::op::Message;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::edns::force_udp_size;
use crate::compare::{compare_responses, CompareOptions};
use crate::frame::CapturedExchange;
use crate::obfuscate::Obfuscator;
use crate::pool::TargetPool;
use crate::resolver;

/// Knobs shared by every replay task.
#[derive(Debug, Clone)]
pub struct ReplaySettings {
    pub edns_size: u16,
    pub clear_names: bool,
    pub dump_exchanges: bool,
    pub timeout: Duration,
    pub compare: CompareOptions,
}

pub struct Orchestrator {
    context: ReplayContext,
}

#[derive(Clone)]
struct ReplayContext {
    pool: Arc<TargetPool>,
    obfuscator: Arc<Obfuscator>,
    settings: Arc<ReplaySettings>,
}

impl Orchestrator {
    pub fn new(
        pool: Arc<TargetPool>,
        obfuscator: Arc<Obfuscator>,
        settings: ReplaySettings,
    ) -> Self {
        Self {
            context: ReplayContext {
                pool,
                obfuscator,
                settings: Arc::new(settings),
            },
        }
    }

    /// Drain captured exchanges, replaying each concurrently. Returns once
    /// the record channel closes and every outstanding replay has reported.
    pub async fn run(&self, mut records: mpsc::Receiver<CapturedExchange>) {
        let (report_tx, mut report_rx) = mpsc::unbounded_channel::<String>();
        let mut outstanding: usize = 0;
        let mut input_open = true;

        while input_open || outstanding > 0 {
            tokio::select! {
                record = records.recv(), if input_open => match record {
                    Some(exchange) => {
                        outstanding += 1;
                        self.spawn_replay(exchange, report_tx.clone());
                    }
                    None => input_open = false,
                },
                block = report_rx.recv() => {
                    // sender half lives in self, so recv never yields None here
                    if let Some(block) = block {
                        outstanding -= 1;
                        emit(&block);
                    }
                }
            }
        }
        debug!("all replay tasks drained");
    }

    fn spawn_replay(&self, exchange: CapturedExchange, report: mpsc::UnboundedSender<String>) {
        let context = self.context.clone();
        let task = tokio::spawn(async move { replay_record(context, exchange).await });
        tokio::spawn(async move {
            // confine panics to the record they belong to
            let block = match task.await {
                Ok(block) => block,
                Err(e) => {
                    warn!(error = %e, "replay task aborted");
                    format!("Error replaying captured record; {e}\n")
                }
            };
            let _ = report.send(block);
        });
    }
}

async fn replay_record(context: ReplayContext, exchange: CapturedExchange) -> String {
    let mut block = String::new();
    if context.settings.dump_exchanges {
        block.push_str(&exchange.render_dump());
    }

    let Some(question) = exchange.query.queries().first().cloned() else {
        warn!(peer = %exchange.peer, "captured query has no question section");
        block.push_str("Captured query has no question section, skipping\n");
        return block;
    };

    for target in context.pool.next() {
        // each target sees the captured question, not the previous rewrite
        let mut query = exchange.query.clone();

        let rewritten = if context.settings.clear_names {
            question.name().clone()
        } else {
            match context.obfuscator.obfuscate_name(question.name()) {
                Ok(name) => name,
                Err(e) => {
                    block.push_str(&format!("Error rewriting question name; {e}\n"));
                    continue;
                }
            }
        };

        block.push_str(&format!(
            "Sending query '{}' {} as '{}' to {} @ [{}]:53\n",
            question.name(),
            question.query_type(),
            rewritten,
            target.ns_name,
            target.addr,
        ));

        rewrite_question(&mut query, rewritten);
        force_udp_size(&mut query, context.settings.edns_size);

        let server = SocketAddr::new(target.addr, 53);
        match resolver::exchange(&query, server, context.settings.timeout).await {
            Ok((response, rtt)) => {
                let report = compare_responses(&exchange.answer, &response, context.settings.compare);
                block.push_str(&report.to_string());
                context.pool.update_srtt(target.addr, rtt);
            }
            Err(e) => {
                block.push_str(&format!("Error querying shadow server; {e}\n"));
            }
        }
    }

    block
}

fn rewrite_question(query: &mut Message, name: hickory_proto::rr::Name) {
    let mut questions = query.take_queries();
    if let Some(first) = questions.first_mut() {
        first.set_name(name);
    }
    query.add_queries(questions);
}

/// Single writer for stdout; one flush per finished record keeps blocks
/// contiguous.
fn emit(block: &str) {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let _ = handle.write_all(block.as_bytes());
    let _ = handle.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::op::{MessageType, OpCode, Query};
    use hickory_proto::rr::{DNSClass, Name, RecordType};
    use std::str::FromStr;

    #[test]
    fn test_rewrite_question_replaces_only_the_name() {
        let mut message = Message::new();
        message.set_id(7);
        message.set_message_type(MessageType::Query);
        message.set_op_code(OpCode::Query);
        let mut question = Query::new();
        question.set_name(Name::from_str("www.example.com.").unwrap());
        question.set_query_type(RecordType::AAAA);
        question.set_query_class(DNSClass::IN);
        message.add_query(question);

        rewrite_question(&mut message, Name::from_str("ymmv.0011223344556677.com.").unwrap());

        let question = &message.queries()[0];
        assert_eq!(
            question.name(),
            &Name::from_str("ymmv.0011223344556677.com.").unwrap()
        );
        assert_eq!(question.query_type(), RecordType::AAAA);
        assert_eq!(question.query_class(), DNSClass::IN);
    }
}
