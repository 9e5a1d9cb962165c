//! Fund collector CLI.
//!
//! ```text
//!   keys (env / file) ──┐
//!   collector.toml ─────┼─▶ Collector ──▶ for each account:
//!                       │                  balance → policy → nonce
//!                       │                  → build → sign → submit
//!                       │                         │
//!                       └─────────────────────────▼
//!                                          SweepReport → stdout
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};

use fund_collector::blockchain::wallet::resolve_address;
use fund_collector::blockchain::{BlockchainClient, TokenContract};
use fund_collector::config::keys::load_keys;
use fund_collector::config::{load_config, CollectorConfig, ConfigError};
use fund_collector::observability::{logging, metrics};
use fund_collector::sweep::{Collector, CollectorSettings, SweepReport};

#[derive(Parser)]
#[command(name = "fund-collector")]
#[command(about = "Sweep token and native balances from many accounts into one destination", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "collector.toml")]
    config: PathBuf,

    /// Override the configured log level or filter directive.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep token balances
    Tokens,
    /// Sweep native currency balances
    Native,
    /// Sweep tokens, then native currency
    All,
    /// Print the address of every configured key
    Addresses,
    /// Validate the configuration and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    logging::init_logging(log_level, config.observability.json_logs);

    tracing::info!(config = %cli.config.display(), "fund-collector v0.1.0 starting");

    if let Commands::CheckConfig = cli.command {
        print_config_summary(&config);
        return Ok(ExitCode::SUCCESS);
    }

    let keys = load_keys(&config.collector)?;

    if let Commands::Addresses = cli.command {
        for (i, key) in keys.iter().enumerate() {
            match resolve_address(key) {
                Ok(address) => println!("{:>4}  {}", i, address),
                Err(e) => println!("{:>4}  {}", i, e),
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let settings = CollectorSettings::from_config(&config)?;
    settings.admit_keys(&keys)?;

    let client = Arc::new(BlockchainClient::new(config.rpc.clone()).await?);
    if !client.is_healthy().await {
        tracing::warn!(rpc_url = %config.rpc.url, "No RPC provider answered a block number query");
    }
    let collector = Collector::new(client.clone(), settings, keys)?;

    let mut reports = Vec::new();

    if matches!(cli.command, Commands::Tokens | Commands::All) {
        let token = token_contract(&config)?;
        let decimals = match token.query_decimals(client.as_ref()).await {
            Ok(decimals) => Some(decimals),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read token decimals; reporting raw amounts");
                None
            }
        };

        println!("Collecting tokens from {} accounts...", collector.account_count());
        let report = collector
            .sweep_tokens(&token, config.token.min_amount)
            .await;
        print_report(&report, decimals);
        reports.push(report);
    }

    if matches!(cli.command, Commands::Native | Commands::All) {
        println!("Collecting native currency from {} accounts...", collector.account_count());
        let report = collector
            .sweep_native(config.native.min_amount, config.native.reserve_amount)
            .await;
        print_report(&report, Some(18));
        reports.push(report);
    }

    let any_failed = reports.iter().any(|r| r.summary().failed > 0);
    Ok(if any_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn token_contract(config: &CollectorConfig) -> Result<TokenContract, ConfigError> {
    let address: Address = config.token.contract.parse().map_err(|_| {
        ConfigError::Validation(vec![
            fund_collector::config::validation::ValidationError::new(
                "token.contract",
                "required for a token sweep",
            ),
        ])
    })?;
    Ok(TokenContract::new(address))
}

fn print_report(report: &SweepReport, decimals: Option<u8>) {
    for line in report.render(decimals) {
        println!("{}", line);
    }
    println!();
}

fn print_config_summary(config: &CollectorConfig) {
    println!("rpc:          {}", config.rpc.url);
    println!("failovers:    {}", config.rpc.failover_urls.len());
    println!("destination:  {}", config.collector.destination);
    println!("gas price:    {} wei", config.collector.gas_price_wei);
    if config.token.contract.is_empty() {
        println!("token:        <not configured>");
    } else {
        println!(
            "token:        {} (min {}, gas limit {})",
            config.token.contract, config.token.min_amount, config.token.gas_limit
        );
    }
    println!(
        "native:       min {}, reserve {}",
        config.native.min_amount, config.native.reserve_amount
    );
    println!(
        "pacing:       {} ms, concurrency {}",
        config.pacing.delay_ms, config.pacing.max_concurrency
    );
}
