//! Path-addressed caching forward proxy.
//!
//! Requests shaped `/{protocol}/{host}/{rest...}` are proxied to
//! `{protocol}://{host}/{rest}` with the original query string attached.
//! Successful responses are cached at the edge and replayed on later
//! requests to the same inbound URL.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                  EDGE PROXY                    │
//!                    │                                                │
//!   Client Request   │  ┌─────────┐   ┌──────────┐   ┌─────────────┐ │
//!   ─────────────────┼─▶│  http   │──▶│ routing  │──▶│ cache policy│ │
//!                    │  │ server  │   │ (target) │   │  evaluator  │ │
//!                    │  └─────────┘   └──────────┘   └──────┬──────┘ │
//!                    │                                      │        │
//!                    │                  hit ┌───────────────┤ miss   │
//!                    │                      ▼               ▼        │
//!   Client Response  │  ┌─────────┐   ┌──────────┐   ┌─────────────┐ │
//!   ◀────────────────┼──│response │◀──│  cache   │   │  upstream   │◀┼── Origin
//!                    │  │assembler│   │  store   │◀──│   fetcher   │ │   Server
//!                    │  └─────────┘   └──────────┘   └─────────────┘ │
//!                    │                  (async write via queue)      │
//!                    └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use edge_proxy::config::{loader, watcher, ProxyConfig};
use edge_proxy::http::HttpServer;
use edge_proxy::lifecycle::Shutdown;
use edge_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "edge-proxy")]
#[command(about = "Path-addressed HTTP forward proxy with an edge response cache")]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => loader::load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!("edge-proxy v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        default_ttl_secs = config.cache.default_ttl_secs,
        max_ttl_secs = config.cache.max_ttl_secs,
        "Configuration loaded"
    );

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

    // Config hot reload only makes sense when a file was given.
    let (config_tx, config_rx) = mpsc::unbounded_channel();
    let _watcher = match &cli.config {
        Some(path) => Some(watcher::watch(path, config_tx)?),
        None => None,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, config_rx, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
