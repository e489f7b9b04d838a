//! Payment Agent Server
//!
//! Accepts payment requests over HTTP, watches the destination chain for the
//! matching USDC mint and splits it between two parties.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use alloy::network::EthereumWallet;
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use config::{ConfigLoader, get_private_key};
use payagent_core::agent::PaymentAgent;
use payagent_core::chain::EvmChain;
use payagent_core::events::completion_channel;
use payagent_core::processors::CompletionLogger;
use payagent_core::utils::TokioClock;
use server::{build_router, run_server};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Payment Agent - USDC payment listener and splitter
#[derive(Parser, Debug)]
#[command(name = "payagent-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./payagent-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting payagent-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let loaded_config = ConfigLoader::new(&args.config, args.listen)
        .load()
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Operating account
    let private_key = get_private_key().map_err(|e| {
        tracing::error!("{}", e);
        e
    })?;
    let signer: PrivateKeySigner = private_key.trim().parse().map_err(|e| {
        tracing::error!("Invalid private key: {}", e);
        e
    })?;
    let operator = signer.address();
    let agent_config = loaded_config.agent_config(operator).map_err(|e| {
        tracing::error!("Invalid agent configuration: {}", e);
        e
    })?;
    tracing::info!(
        operator = %operator,
        recipient = %agent_config.recipient,
        party_a = %agent_config.parties.party_a,
        party_b = %agent_config.parties.party_b,
        "Operating account ready"
    );

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(loaded_config.rpc_url.clone());
    let chain = Arc::new(
        EvmChain::new(provider, operator)
            .with_confirmation_timeout(loaded_config.confirmation_timeout),
    );

    // Completion pipeline
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (completion_tx, completion_rx) = completion_channel();
    let completion_logger =
        tokio::spawn(CompletionLogger::new(completion_rx, shutdown_rx).run());

    let agent = Arc::new(PaymentAgent::new(
        agent_config,
        chain.clone(),
        chain,
        Arc::new(TokioClock),
        completion_tx,
    ));

    let router = build_router(AppState::new(agent.clone()));

    tracing::info!("Starting HTTP server on {}", loaded_config.listen);
    let result = run_server(router, loaded_config.listen).await;

    // Stop listeners first so their completions reach the logger
    agent.shutdown().await;
    let _ = shutdown_tx.send(true);
    if let Err(e) = completion_logger.await {
        tracing::error!("Completion logger task failed: {}", e);
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,payagent_core=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
