use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use market_account::{SecretKeySigner, Signer};
use market_config::ConfigLoader;
use market_core::{PredictionMarket, RoundScheduler};
use market_rpc::HttpLedgerRpc;
use market_submitter::{SubmitterConfig, TransactionSubmitter};
use market_types::NetworkId;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod implementations;

use implementations::contract::RpcContractClient;

#[derive(Parser)]
#[command(name = "market-service")]
#[command(about = "Prediction market operator service", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	config: PathBuf,

	#[arg(long, env = "MARKET_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Start the operator service
	Start,
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level);

	match cli.command {
		Some(Commands::Start) | None => start_service(cli).await,
		Some(Commands::Validate) => validate_config(cli).await,
	}
}

async fn start_service(cli: Cli) -> Result<()> {
	info!("Starting prediction market operator");
	info!("Loading configuration from: {:?}", cli.config);

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")?;

	let network = NetworkId::new(config.network.passphrase.clone());
	let rpc = Arc::new(HttpLedgerRpc::new(
		config.network.rpc_url.clone(),
		network.clone(),
	));

	let signer = Arc::new(
		SecretKeySigner::from_hex(&config.contract.operator_secret)
			.context("Invalid operator secret key")?,
	);
	info!("Operator account: {}", signer.address());

	let submitter = TransactionSubmitter::with_config(
		rpc.clone(),
		SubmitterConfig {
			max_attempts: config.submitter.max_attempts,
			poll_interval: Duration::from_millis(config.submitter.poll_interval_ms),
		},
	);

	let contract = Arc::new(RpcContractClient::new(
		rpc,
		network,
		config.contract.id.clone(),
		signer.address().to_string(),
	));

	let market = Arc::new(PredictionMarket::new(contract, submitter, signer));
	let scheduler = RoundScheduler::new(
		market,
		Duration::from_secs(config.scheduler.tick_buffer_secs),
	);

	let status = scheduler
		.start()
		.await
		.context("Failed to start round scheduler")?;
	info!(
		"Round scheduler running, executing every {}s",
		status.interval_seconds
	);

	signal::ctrl_c()
		.await
		.context("Failed to listen for shutdown signal")?;

	info!("Shutdown signal received, stopping scheduler");
	// The scheduler may already have paused itself; that is fine.
	let _ = scheduler.pause().await;

	info!("Prediction market operator stopped");
	Ok(())
}

async fn validate_config(cli: Cli) -> Result<()> {
	info!("Validating configuration file: {:?}", cli.config);

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")?;

	info!("Configuration is valid");
	info!("Network: {}", config.network.passphrase);
	info!("RPC endpoint: {}", config.network.rpc_url);
	info!("Contract: {}", config.contract.id);
	info!(
		"Submitter: {} attempts, {}ms poll interval",
		config.submitter.max_attempts, config.submitter.poll_interval_ms
	);

	Ok(())
}

fn setup_tracing(log_level: &str) {
	let filter = tracing_subscriber::EnvFilter::try_new(log_level)
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer())
		.init();
}
