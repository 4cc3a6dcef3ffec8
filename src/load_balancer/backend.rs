//! Backend abstraction.
//!
//! # Responsibilities
//! - Hold a single configured backend address verbatim
//! - Parse the address into a connectable target on demand
//!
//! # Design Decisions
//! - Parsing happens per dispatch, not at pool construction. A malformed
//!   entry stays in the rotation and fails every request routed to it.

use axum::http::uri::{Authority, Scheme};
use url::Url;

use crate::http::response::DispatchError;

/// A single backend server, identified by its base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    address: String,
}

impl Backend {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// The address exactly as configured.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Parse the address into a forwarding target.
    pub fn target(&self) -> Result<Target, DispatchError> {
        let invalid = |reason: String| DispatchError::InvalidBackend {
            address: self.address.clone(),
            reason,
        };

        let url = Url::parse(&self.address).map_err(|e| invalid(e.to_string()))?;

        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => return Err(invalid(format!("unsupported scheme '{}'", other))),
        };

        let host = url
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = Authority::try_from(authority.as_str())
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Target {
            scheme,
            authority,
            base_path: url.path().to_string(),
            base_query: url.query().map(str::to_string),
        })
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.address)
    }
}

/// A parsed backend address, ready for URI rewriting.
#[derive(Debug, Clone)]
pub struct Target {
    pub scheme: Scheme,
    pub authority: Authority,
    /// Path component of the backend URL; `/` when none was given.
    pub base_path: String,
    pub base_query: Option<String>,
}
