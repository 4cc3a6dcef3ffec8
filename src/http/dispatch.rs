//! Request dispatch.
//!
//! One linear pipeline per request:
//! select backend → parse target → build forwarding request → send → relay.
//! Any failure ends the pipeline with an error response. Nothing is retried
//! and no other backend is tried.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
};

use crate::http::request::forward_request;
use crate::http::response::{relay, DispatchError};
use crate::http::server::AppState;
use crate::load_balancer::Target;
use crate::observability::logging::ROUTING_TARGET;
use crate::resilience::timeouts::with_timeout;

/// Universal proxy handler mounted on every path.
pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let selection = state.balancer.next();
    let backend = selection.backend;
    tracing::info!(
        target: ROUTING_TARGET,
        backend = %backend,
        cursor = selection.cursor,
        method = %method,
        path = %path,
        "Routing request"
    );

    let result = match backend.target() {
        Ok(target) => forward(&state, request, &target).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            if matches!(e, DispatchError::InvalidBackend { .. }) {
                tracing::error!(backend = %backend, error = %e, "Cannot forward to backend");
            } else {
                tracing::warn!(backend = %backend, method = %method, path = %path, error = %e, "Upstream error");
            }
            e.into_response()
        }
    }
}

async fn forward(
    state: &AppState,
    request: Request<Body>,
    target: &Target,
) -> Result<Response, DispatchError> {
    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let outbound = forward_request(request, target, client_addr)?;

    let response = with_timeout(state.request_timeout, async {
        state.client.request(outbound).await.map_err(DispatchError::from)
    })
    .await?;

    tracing::debug!(status = %response.status(), "Backend responded");
    Ok(relay(response))
}
