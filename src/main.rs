//! HTTP relay server.
//!
//! ```text
//!     Caller                       ┌──────────────────────────────────────┐
//!     POST /proxy {method,url,..}  │               RELAY                  │
//!     ─────────────────────────────┼─▶ http::proxy ──▶ relay::executor ───┼──▶ Third-party
//!                                  │                        │             │     server
//!     {id,status,headers,length}   │                        ▼             │
//!     ◀────────────────────────────┼──────────────── registry (id → body) │
//!                                  └──────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use relay_proxy::config::resolve_config;
use relay_proxy::lifecycle::{signals, Shutdown};
use relay_proxy::observability::{logging, metrics};
use relay_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "relay-proxy")]
#[command(about = "Single-endpoint HTTP relay", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = resolve_config(args.config.as_deref(), args.bind)?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_file = ?args.config,
        bind_address = %config.listener.bind_address,
        "relay-proxy starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
