//! GM dashboard daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   gm-cli / browser
//!        │  HTTP JSON
//!        ▼
//!  ┌──────────┐    ┌────────────────────┐    ┌─────────────────────┐
//!  │   http   │───▶│ session controller │───▶│ blockchain boundary │──▶ wallet / RPC
//!  │  server  │    │  state + tasks     │    │ WalletProvider      │
//!  └──────────┘    └─────────┬──────────┘    │ GreetingContract    │
//!                            │               └─────────────────────┘
//!                            ▼
//!                    ┌───────────────┐
//!                    │   cooldown    │──▶ lastSend_<address> records
//!                    │ store + clock │
//!                    └───────────────┘
//!
//!  cross-cutting: config, observability, resilience, lifecycle
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use gm_dashboard::blockchain::detect_wallet;
use gm_dashboard::config::loader::load_or_default;
use gm_dashboard::cooldown::{CooldownStore, FileStore, MemoryStore, SystemClock};
use gm_dashboard::lifecycle::signals::shutdown_signal;
use gm_dashboard::observability::{logging, metrics};
use gm_dashboard::session::{ControllerSettings, SessionController};
use gm_dashboard::HttpServer;

#[derive(Parser)]
#[command(name = "gm-dashboard", version, about = "Wallet session daemon for the GM greeting contract")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "gm.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config_found = args.config.exists();
    let config = load_or_default(&args.config)?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gm-dashboard starting");
    if !config_found {
        tracing::info!(path = %args.config.display(), "Config file not found, using defaults");
    }
    tracing::info!(
        config = %args.config.display(),
        chain_id = config.chain.chain_id,
        contract = %config.contract.address,
        bind_address = %config.server.bind_address,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let wallet = detect_wallet(&config)?;
    if wallet.is_none() {
        tracing::warn!("No wallet configured; connect requests will fail until one is available");
    }

    let store: Arc<dyn CooldownStore> = match &config.cooldown.store_path {
        Some(path) => {
            let store = FileStore::open(path)?;
            tracing::info!(path = %store.path().display(), "Cooldown records loaded");
            Arc::new(store)
        }
        None => {
            tracing::info!("Cooldown records kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let settings = ControllerSettings::from_config(&config)?;
    let controller = Arc::new(SessionController::new(wallet, store, Arc::new(SystemClock), settings));

    if config.wallet.auto_connect {
        let controller = controller.clone();
        tokio::spawn(async move {
            if let Err(e) = controller.connect().await {
                tracing::warn!(error = %e, "Auto-connect failed");
            }
        });
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(controller.clone(), &config.server);
    server.run(listener, shutdown_signal()).await?;

    controller.disconnect().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
