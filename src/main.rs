//! Launchpad engine daemon.
//!
//! Wires the chain reader, vanity supply, trade orchestrator and token
//! directory together, then runs a discovery loop that logs the served
//! views and relays classification events.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(dead_code)]
#![warn(unused_must_use)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::read_keypair_file;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use launchpad_engine::chain::{RetrySettings, RpcChainReader};
use launchpad_engine::config::Config;
use launchpad_engine::orchestrator::{KeypairSigner, TradeOrchestrator, TransactionSigner};
use launchpad_engine::scanner::{SystemClock, TokenDirectory};
use launchpad_engine::types::TokenEvent;
use launchpad_engine::vanity::{VanityPool, VanityService};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Mints to track at startup (repeatable)
    #[arg(short, long)]
    track: Vec<Pubkey>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("🚀 Starting launchpad engine");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    info!("📋 Loading configuration from: {}", args.config);
    let config = Config::from_file_with_env(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    info!("🔑 Loading fee payer from: {}", config.wallet.keypair_path);
    let payer = read_keypair_file(&config.wallet.keypair_path)
        .map_err(|e| anyhow::anyhow!("Failed to load fee payer keypair: {e}"))?;
    let signer = Arc::new(KeypairSigner::new(payer));
    info!("💼 Fee payer address: {}", signer.pubkey());

    info!("🌐 Connecting to RPC endpoint: {}", config.rpc.endpoint);
    let chain = Arc::new(RpcChainReader::new(
        config.rpc.endpoint.clone(),
        RetrySettings {
            max_attempts: config.rpc.max_attempts,
            base_delay_ms: config.rpc.backoff_base_ms,
            max_delay_ms: config.rpc.backoff_max_ms,
        },
    ));

    let vanity_config = config.vanity_config();
    let pool = config.vanity.pool_path.as_ref().map(|path| {
        info!("🔤 Loading vanity pool from: {path}");
        VanityPool::spawn_load(PathBuf::from(path), vanity_config.suffix.clone())
    });
    let _vanity = VanityService::new(vanity_config, pool);

    let _orchestrator = TradeOrchestrator::new(
        chain.clone(),
        signer,
        config.orchestrator_config()?,
    );

    info!("👁️ Starting token directory");
    let directory = Arc::new(TokenDirectory::new(
        chain,
        config.scanner_config(),
        Arc::new(SystemClock),
    ));
    for mint in &args.track {
        directory.track_mint(*mint);
    }
    info!("   Tracking {} mints", directory.tracked_count());

    info!("✅ All components initialized");
    run_discovery_loop(directory).await
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        "launchpad_engine=debug,info"
    } else {
        "launchpad_engine=info,warn,error"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    Ok(())
}

/// Log classification events as they arrive and report the served views
/// once a minute.
async fn run_discovery_loop(directory: Arc<TokenDirectory>) -> Result<()> {
    info!("🎬 Discovery loop started");

    let mut events = directory.subscribe();
    let mut report_interval = tokio::time::interval(tokio::time::Duration::from_secs(60));

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(TokenEvent::Created { mint }) => info!("🆕 Token created: {mint}"),
                    Ok(TokenEvent::Graduating { mint }) => info!("📈 Approaching graduation: {mint}"),
                    Ok(TokenEvent::Graduated { mint }) => info!("🎓 Graduated to pool: {mint}"),
                    Err(e) => warn!("Event stream lagged: {e}"),
                }
            }

            _ = report_interval.tick() => {
                match directory.trending().await {
                    Ok(view) => {
                        info!("📊 Trending tokens: {}", view.len());
                        for record in view.iter().take(5) {
                            info!(
                                "   {} mcap={:.2} SOL vol={:.2} SOL Δ{:+.1}%",
                                record.mint,
                                record.market_cap_sol,
                                record.volume_sol,
                                record.price_change_pct,
                            );
                        }
                    }
                    Err(e) => warn!("Trending refresh failed: {e}"),
                }
                match directory.graduating().await {
                    Ok(view) => {
                        for entry in view.iter().take(5) {
                            info!(
                                "🎓 {} {:.0}% of the way, eta {:?}",
                                entry.record.mint,
                                entry.progress_pct,
                                entry.eta,
                            );
                        }
                    }
                    Err(e) => warn!("Graduating refresh failed: {e}"),
                }
            }
        }
    }
}
