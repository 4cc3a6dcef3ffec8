//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration and apply command-line overrides
//! - Validate before anything binds
//! - Bind the listener and print the startup banner
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - An empty backend pool is a startup error, never a runtime one

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{read_config, validate_config, ConfigError, ListenerConfig, ProxyConfig};
use crate::load_balancer::{BackendPool, PoolError};
use crate::observability::logging::ROUTING_TARGET;

/// Fatal errors during process startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Pool(#[from] PoolError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Values given on the command line; each replaces its configured counterpart.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
    /// Replaces the whole backend list when non-empty.
    pub backends: Vec<String>,
    pub log_level: Option<String>,
}

/// Build the effective configuration: file (or defaults), then overrides.
/// Validation is left to [`check_config`] so logging can be set up first.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: Overrides,
) -> Result<ProxyConfig, StartupError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };

    if let Some(bind_address) = overrides.bind_address {
        config.listener.bind_address = bind_address;
    }
    if !overrides.backends.is_empty() {
        config.backends = overrides.backends;
    }
    if let Some(log_level) = overrides.log_level {
        config.observability.log_level = log_level;
    }

    Ok(config)
}

pub fn check_config(config: &ProxyConfig) -> Result<(), StartupError> {
    validate_config(config).map_err(ConfigError::Validation)?;
    Ok(())
}

/// Bind the proxy's listening socket.
pub async fn bind_listener(config: &ListenerConfig) -> Result<TcpListener, StartupError> {
    let bind_err = |source| StartupError::Bind {
        address: config.bind_address.clone(),
        source,
    };

    let listener = TcpListener::bind(config.socket_address().as_str())
        .await
        .map_err(bind_err)?;
    tracing::info!(address = %listener.local_addr().map_err(bind_err)?, "Listener bound");
    Ok(listener)
}

/// Human-readable startup banner.
pub fn log_banner(addr: SocketAddr, pool: &BackendPool) {
    tracing::info!(target: ROUTING_TARGET, "Load balancer running on {}", addr);
    tracing::info!(target: ROUTING_TARGET, "Balancing between servers: {:?}", pool.addresses());
}
