//! Relay server binary entry point.

use anyhow::Result;
use dbrelay::{DataHandler, RelayServer, ServerConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::default();
    init_tracing(&config.log_filter);

    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let handler = DataHandler::new();
    let server = RelayServer::new(config, handler);

    info!("relay ready, waiting for requests...");
    server.run().await?;

    info!("shutdown complete");
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // JSON structured logging to stderr; stdout carries the protocol.
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .json()
        .init();
}
