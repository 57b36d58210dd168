//! Chat Gateway
//!
//! Relays chat conversations to a hosted model and streams the answer back.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http server ──▶ routing ──┬──▶ asset store ──────────────┐
//!                      (request id,              │                              │
//!                       trace, limits)           └──▶ chat handler              │
//!                                                      parse → validate         │
//!                                                      → normalize → dispatch   │
//!                                                            │                  │
//!                                                            ▼                  │
//!                                                     inference backend         │
//!                                                            │ (stream)         │
//!     Client Response                                        ▼                  │
//!     ◀──────────────────────────────────────────── pass-through ◀──────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use chat_gateway::config::{load_config, GatewayConfig};
use chat_gateway::lifecycle::{signals, Shutdown};
use chat_gateway::observability::{logging, metrics};
use chat_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "chat-gateway")]
#[command(about = "HTTP gateway streaming chat completions from a hosted model", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!("chat-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        model = %config.chat.model,
        max_tokens = config.chat.max_tokens,
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let server = HttpServer::from_config(config.clone())?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    match &config.listener.tls {
        Some(tls) => {
            let addr: SocketAddr = config.listener.bind_address.parse()?;
            server.run_tls(addr, tls, server_shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, server_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
