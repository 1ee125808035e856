//! dcrpulse daemon: treasury spend discovery and vote tallies against a dcrd node.

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pulse_ledger::LedgerSource;
use pulse_rpc::{DcrdClient, DcrdClientConfig};
use pulse_treasury::{TreasuryConfig, TreasuryService};
use pulse_types::{Network, TxHash};
use pulse_utils::LogFormat;

#[derive(Parser)]
#[command(name = "pulse-daemon", about = "Decred treasury spend scanner and vote tally")]
struct Cli {
    /// Network the node serves: "mainnet", "testnet" or "simnet".
    /// When a config file is provided, defaults to the file's network value.
    #[arg(long, env = "PULSE_NETWORK")]
    network: Option<String>,

    /// dcrd JSON-RPC endpoint (defaults to the local node for the network).
    #[arg(long, env = "PULSE_RPC_URL")]
    rpc_url: Option<String>,

    #[arg(long, env = "PULSE_RPC_USER")]
    rpc_user: Option<String>,

    #[arg(long, env = "PULSE_RPC_PASSWORD", hide_env_values = true)]
    rpc_password: Option<String>,

    /// dcrd's rpc.cert, trusted in addition to the system roots.
    #[arg(long, env = "PULSE_RPC_CERT")]
    rpc_cert: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[arg(long, env = "PULSE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "PULSE_LOG_LEVEL")]
    log_level: Option<String>,

    /// How often to poll a running scan or tally, in milliseconds.
    #[arg(long, default_value_t = 1000, env = "PULSE_POLL_MS")]
    poll_ms: u64,

    /// Print Prometheus metrics to stderr on exit.
    #[arg(long)]
    metrics: bool,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Treasury balance and the spends currently up for vote.
    Info,
    /// Treasury spends in the mempool.
    Mempool,
    /// Scan the chain for mined treasury spends, printing each as it is found.
    Scan {
        /// First height to scan; raised to the treasury activation height.
        #[arg(long, default_value_t = 0)]
        from: i64,
    },
    /// Vote tally for one treasury spend.
    Tally {
        /// Transaction hash of the treasury spend.
        hash: String,
        /// Height the spend was mined at.
        #[arg(long, default_value_t = 0)]
        height: i64,
        /// Expiry height of a spend still in the mempool.
        #[arg(long, default_value_t = 0)]
        expiry: i64,
        /// The spend is still in the mempool.
        #[arg(long)]
        mempool: bool,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<TreasuryConfig> {
    let mut config = match &cli.config {
        Some(path) => TreasuryConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TreasuryConfig::default(),
    };

    if let Some(network) = &cli.network {
        config.network = network.parse::<Network>()?;
    }
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = Some(url.clone());
    }
    if let Some(user) = &cli.rpc_user {
        config.rpc_user = user.clone();
    }
    if let Some(password) = &cli.rpc_password {
        config.rpc_password = password.clone();
    }
    if let Some(cert) = &cli.rpc_cert {
        config.rpc_cert = Some(cert.clone());
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.parse::<LogFormat>().map_err(anyhow::Error::msg)?;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_scan(service: &TreasuryService, from: i64, poll: Duration) -> anyhow::Result<()> {
    service.trigger_historical_scan(from)?;
    loop {
        let progress = service.scan_progress();
        for spend in &progress.new_spends {
            println!("{}", serde_json::to_string(spend)?);
        }
        if !progress.is_scanning {
            tracing::info!(found = progress.found, "{}", progress.message);
            return Ok(());
        }
        tracing::info!(
            height = progress.current_height,
            tip = progress.total_height,
            "scan {:.1}% complete",
            progress.progress
        );
        tokio::time::sleep(poll).await;
    }
}

async fn run_tally(
    service: &TreasuryService,
    hash: TxHash,
    height: i64,
    expiry: i64,
    mempool: bool,
    poll: Duration,
) -> anyhow::Result<()> {
    loop {
        let tally = service.get_tally(hash, height, expiry, mempool).await?;
        if tally.voting_complete || tally.in_mempool {
            return print_json(&tally);
        }
        if let Some(progress) = service.tally_progress(&hash) {
            tracing::info!(
                block = progress.current_block,
                yes = progress.yes_votes,
                no = progress.no_votes,
                eta = %pulse_utils::format_duration(progress.estimated_secs),
                "{} ({:.1}%)",
                progress.message,
                progress.progress
            );
        }
        tokio::time::sleep(poll).await;
    }
}

async fn run(service: &TreasuryService, command: Command, poll: Duration) -> anyhow::Result<()> {
    match command {
        Command::Info => print_json(&service.fetch_treasury_info().await?),
        Command::Mempool => print_json(&service.probe_mempool().await?),
        Command::Scan { from } => run_scan(service, from, poll).await,
        Command::Tally {
            hash,
            height,
            expiry,
            mempool,
        } => {
            let hash: TxHash = hash
                .parse()
                .with_context(|| format!("invalid transaction hash {hash}"))?;
            run_tally(service, hash, height, expiry, mempool, poll).await
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    pulse_utils::init_logging(config.log_format, &config.log_level);

    let client = DcrdClient::new(DcrdClientConfig {
        url: config.resolved_rpc_url(),
        user: config.rpc_user.clone(),
        password: config.rpc_password.clone(),
        cert: config.rpc_cert.clone(),
        timeout: Duration::from_secs(config.request_timeout_secs),
    })?;
    tracing::info!(
        network = config.network.as_str(),
        url = client.url(),
        "using dcrd node"
    );

    let source: Arc<dyn LedgerSource> = Arc::new(client);
    let service = TreasuryService::from_config(Some(source), &config);
    let poll = Duration::from_millis(cli.poll_ms.max(10));

    let result = tokio::select! {
        result = run(&service, cli.command, poll) => result,
        _ = service.shutdown_controller().wait_for_signal() => {
            service.shutdown();
            service.wait_for_scan().await;
            Ok(())
        }
    };

    if cli.metrics {
        eprintln!("{}", service.metrics().render());
    }
    result
}
