//! Round-robin HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌────────────────────────────────────────────┐
//!                     │                LOAD BALANCER               │
//!                     │                                            │
//!   Client Request    │  ┌─────────┐    ┌──────────┐    ┌────────┐ │
//!   ──────────────────┼─▶│  axum   │───▶│ dispatch │───▶│ round  │ │
//!                     │  │ server  │    │          │◀───│ robin  │ │
//!                     │  └─────────┘    └────┬─────┘    └────────┘ │
//!                     │                      │                     │
//!   Client Response   │  ┌─────────┐    ┌────▼─────┐               │
//!   ◀─────────────────┼──│response │◀───│  hyper   │◀──────────────┼──── Backend
//!                     │  │  relay  │    │  client  │               │
//!                     │  └─────────┘    └──────────┘               │
//!                     └────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rr_proxy::http::HttpServer;
use rr_proxy::lifecycle::{
    signals::spawn_signal_handler,
    startup::{bind_listener, check_config, log_banner, resolve_config, Overrides},
    Shutdown, StartupError,
};
use rr_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "rr-proxy")]
#[command(about = "Round-robin HTTP load balancer", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8080.
    #[arg(short, long)]
    bind: Option<String>,

    /// Backend base URL; repeat to build the pool in order.
    #[arg(long = "backend")]
    backends: Vec<String>,

    /// Log level (trace, debug, info, warn, error, off).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("rr-proxy: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let overrides = Overrides {
        bind_address: cli.bind,
        backends: cli.backends,
        log_level: cli.log_level,
    };
    let config = resolve_config(cli.config.as_deref(), overrides)?;

    logging::init(&config.observability.log_level);
    tracing::info!("rr-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    check_config(&config)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        connect_timeout_secs = ?config.timeouts.connect_secs,
        request_timeout_secs = ?config.timeouts.request_secs,
        "Configuration loaded"
    );

    let server = HttpServer::new(&config)?;
    let listener = bind_listener(&config.listener).await?;
    let local_addr = listener.local_addr().map_err(|source| StartupError::Bind {
        address: config.listener.bind_address.clone(),
        source,
    })?;

    log_banner(local_addr, server.balancer().pool());

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    spawn_signal_handler(shutdown);

    if let Err(e) = server.run(listener, server_shutdown).await {
        tracing::error!(error = %e, "Server error");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
