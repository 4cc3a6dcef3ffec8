//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Pick the filter from `RUST_LOG` or the configured level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Human-readable fmt output
//! - Banner and routing lines use their own target so quieter levels keep them

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Target of the startup banner and the per-request routing line.
pub const ROUTING_TARGET: &str = "rr_proxy::routing";

/// Filter used when `RUST_LOG` is not set.
///
/// `warn` and `error` still show routing at info. Only `off` silences it.
pub fn default_filter(log_level: &str) -> String {
    let level = log_level.to_lowercase();
    let mut filter = format!("rr_proxy={level},tower_http={level}");
    if matches!(level.as_str(), "warn" | "error") {
        filter.push_str(&format!(",{ROUTING_TARGET}=info"));
    }
    filter
}

/// Install the global subscriber. Safe to call once per process.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
