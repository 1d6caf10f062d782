use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use hotel_bff::config::load_config;
use hotel_bff::lifecycle::{signals, Shutdown};
use hotel_bff::observability::{logging, metrics};
use hotel_bff::HttpServer;

#[derive(Parser)]
#[command(name = "hotel-bff")]
#[command(about = "Backend-for-frontend for hotel availability and quotes", long_about = None)]
struct Args {
    /// TOML configuration file. `BFF_*` environment variables override it.
    #[arg(short, long, env = "BFF_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "hotel-bff starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        supplier = %config.supplier.name,
        rate_limit_capacity = config.rate_limit.capacity,
        breaker_threshold = config.circuit_breaker.failure_threshold,
        retry_attempts = config.retries.attempts,
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

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
