//! CORS forwarding proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 CORS PROXY                   │
//!   Browser           │  ┌──────────┐   ┌────────────┐   ┌─────────┐ │
//!   ?url=<dest> ──────┼─▶│ listener │──▶│ access log │──▶│ forward │─┼──▶ Destination
//!                     │  └──────────┘   └────────────┘   └────┬────┘ │
//!                     │                                       │      │
//!   ◀─────────────────┼──── CORS headers + status + stream ◀──┘      │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_proxy::lifecycle::{signals, startup, Shutdown};
use cors_proxy::observability::logging;
use cors_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "cors-proxy")]
#[command(about = "Forwards requests to the `url` query parameter and adds CORS headers", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "CORS_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration file.
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = startup::resolve_config(cli.config.as_deref(), cli.listen)?;
    logging::init(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        log_format = ?config.observability.log_format,
        max_redirects = config.upstream.max_redirects,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        trigger.trigger();
    });

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
