//! Wiring: logging, shadow pool, obfuscator and the stdin reader task.

use std::sync::Arc;
use std::time::Duration;

use rootdiff_domain::{default_shadow_servers, Config, ReplayError, ServerTarget};
use rootdiff_infrastructure::compare::CompareOptions;
use rootdiff_infrastructure::frame::{CapturedExchange, FrameReader};
use rootdiff_infrastructure::obfuscate::Obfuscator;
use rootdiff_infrastructure::pool::TargetPool;
use rootdiff_infrastructure::replay::ReplaySettings;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Reports go to stdout, so all diagnostics go to stderr.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn build_services(
    config: &Config,
) -> Result<(Arc<TargetPool>, Arc<Obfuscator>, ReplaySettings), ReplayError> {
    let targets: Vec<ServerTarget> = if config.servers.is_empty() {
        default_shadow_servers()
    } else {
        config
            .servers
            .iter()
            .map(|entry| {
                let addr = entry.address.parse().map_err(|_| {
                    ReplayError::Config(format!("unrecognized IP address '{}'", entry.address))
                })?;
                Ok(ServerTarget::new(entry.name.clone(), addr))
            })
            .collect::<Result<_, ReplayError>>()?
    };

    info!(
        targets = targets.len(),
        policy = config.replay.strategy.as_str(),
        "shadow server pool ready"
    );
    let pool = Arc::new(TargetPool::new(config.replay.strategy, targets)?);

    let obfuscator = Arc::new(match &config.replay.secret {
        Some(hex_secret) => Obfuscator::from_hex(hex_secret)?,
        None => Obfuscator::random()?,
    });

    let settings = ReplaySettings {
        // validated against the u16 range at config load
        edns_size: config.replay.edns_size as u16,
        clear_names: config.replay.clear_names,
        dump_exchanges: config.replay.dump_exchanges,
        timeout: Duration::from_millis(config.replay.timeout_ms),
        compare: CompareOptions {
            compare_checking_disabled: config.comparison.compare_checking_disabled,
        },
    };

    Ok((pool, obfuscator, settings))
}

/// Reader task: decode stdin and publish records until clean EOF or a fatal
/// frame error.
pub async fn read_frames(records: mpsc::Sender<CapturedExchange>) -> Result<(), ReplayError> {
    let mut reader = FrameReader::new(tokio::io::stdin());
    loop {
        match reader.next_exchange().await? {
            Some(exchange) => {
                if records.send(exchange).await.is_err() {
                    // orchestrator went away; nothing left to feed
                    return Ok(());
                }
            }
            None => return Ok(()),
        }
    }
}
