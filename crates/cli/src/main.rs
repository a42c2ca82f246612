use clap::Parser;
use rootdiff_domain::{CliOverrides, Config};
use rootdiff_infrastructure::replay::Orchestrator;
use tokio::sync::mpsc;
use tracing::info;

mod bootstrap;

#[derive(Parser)]
#[command(name = "rootdiff")]
#[command(version)]
#[command(
    about = "Replay captured DNS root queries against a shadow root-server system and report semantic differences"
)]
struct Cli {
    /// Replay with the original (clear) question names
    #[arg(short = 'c', long = "clear-names")]
    clear_names: bool,

    /// Obfuscation secret as 16 hex characters (random by default)
    #[arg(short = 's', long = "secret", value_name = "HEX")]
    secret: Option<String>,

    /// EDNS0 UDP buffer size forced on each replayed query; 0 leaves the
    /// captured query unchanged
    #[arg(short = 'e', long = "edns-size", value_name = "SIZE")]
    edns_size: Option<u32>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Target ordering policy (round-robin, srtt-preferred)
    #[arg(long, value_name = "POLICY")]
    strategy: Option<String>,

    /// Also compare the CD header bit
    #[arg(long)]
    compare_cd: bool,

    /// Print each captured exchange before its replay output
    #[arg(long)]
    dump: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Shadow server IP addresses (at least two to override the built-in list)
    #[arg(value_name = "SERVER")]
    servers: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        clear_names: cli.clear_names,
        secret: cli.secret,
        edns_size: cli.edns_size,
        strategy: cli.strategy,
        compare_checking_disabled: cli.compare_cd,
        dump_exchanges: cli.dump,
        log_level: cli.log_level,
        servers: cli.servers,
    };
    let config = Config::load(cli.config.as_deref(), overrides)?;

    bootstrap::init_logging(&config);
    info!("starting rootdiff v{}", env!("CARGO_PKG_VERSION"));

    let (pool, obfuscator, settings) = bootstrap::build_services(&config)?;

    let (record_tx, record_rx) = mpsc::channel(1);
    let reader = tokio::spawn(bootstrap::read_frames(record_tx));

    let orchestrator = Orchestrator::new(pool, obfuscator, settings);
    orchestrator.run(record_rx).await;

    // a frame error surfaces only after outstanding replays have drained
    reader.await??;
    info!("clean end of capture stream");
    Ok(())
}
