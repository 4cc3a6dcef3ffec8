//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the backend response to the client
//! - Map dispatch failures to HTTP status codes
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Hop-by-hop headers stripped in both directions
//! - A malformed backend address is our fault (500); a failed backend
//!   exchange is the upstream's (502)

use std::time::Duration;

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;
use thiserror::Error;

use crate::http::request::strip_hop_by_hop;

/// Failure while dispatching a single request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The selected backend's configured address cannot be used.
    #[error("invalid backend address '{address}': {reason}")]
    InvalidBackend { address: String, reason: String },

    /// Connecting to or exchanging data with the backend failed.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    /// The backend did not answer within the configured request timeout.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::InvalidBackend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            DispatchError::Upstream(_) => StatusCode::BAD_GATEWAY,
            DispatchError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let body = match self {
            DispatchError::InvalidBackend { .. } => "Server error",
            DispatchError::Upstream(_) => "Upstream request failed",
            DispatchError::Timeout(_) => "Upstream timed out",
        };
        (self.status(), body).into_response()
    }
}

/// Turn the backend response into the client response.
/// Status, end-to-end headers and the streaming body pass through untouched.
pub fn relay(response: hyper::Response<Incoming>) -> Response {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
