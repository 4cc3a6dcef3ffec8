//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject an empty backend pool before anything starts
//! - Validate value ranges (timeouts > 0, bind address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Malformed backend URLs only warn. They stay in the rotation and fail
//!   the requests routed to them with a server error.

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::load_balancer::Backend;

pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no backends configured")]
    NoBackends,

    #[error("invalid listener bind address '{0}'")]
    BindAddress(String),

    #[error("timeout '{0}' must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("unknown log level '{0}'")]
    LogLevel(String),
}

/// `host:port` with a non-empty host and a numeric port. Name resolution
/// is left to the bind itself.
fn is_host_port(address: &str) -> bool {
    match address.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}

/// Check a loaded configuration before it is accepted into the system.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }

    for address in &config.backends {
        if let Err(e) = Backend::new(address.as_str()).target() {
            tracing::warn!(backend = %address, error = %e, "Backend address will fail every request");
        }
    }

    if !is_host_port(&config.listener.socket_address()) {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.connect_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if !VALID_LOG_LEVELS
        .iter()
        .any(|lvl| lvl.eq_ignore_ascii_case(&config.observability.log_level))
    {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
