//! hashdex Server Binary
//!
//! Starts the TCP server for hashdex.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use hashdex::network::Server;
use hashdex::{Config, ReversalService};

/// hashdex Server
#[derive(Parser, Debug)]
#[command(name = "hashdex-server")]
#[command(about = "Concurrent hash-reversal store for 64-bit asset hashes")]
#[command(version)]
struct Args {
    /// Configuration file (JSON); omitted fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory (overrides the config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Listen address host:port (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,

    /// Maximum queued connections (overrides the config file)
    #[arg(short, long)]
    max_connections: Option<usize>,

    /// Connection worker threads (overrides the config file)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Load every table at startup instead of on first use
    #[arg(long)]
    preload: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hashdex=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    // Build config: file (or defaults), then explicit flag overrides
    let mut config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(n) = args.max_connections {
        config.max_connections = n;
    }
    if let Some(n) = args.workers {
        config.worker_threads = n;
    }

    tracing::info!("hashdex Server v{}", hashdex::VERSION);
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("Listen address: {}", config.listen_addr);

    // Open the reversal service
    let service = match ReversalService::open(config.clone()) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    if args.preload {
        match service.load_hashes() {
            Ok(summary) => tracing::info!("Preloaded: {}", summary),
            Err(e) => {
                tracing::error!("Preload failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Start server
    let mut server = match Server::new(config, service) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind listener: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
