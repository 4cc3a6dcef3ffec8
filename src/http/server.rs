//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the universal proxy handler
//! - Build the shared upstream client
//! - Wire up request tracing
//! - Serve on a listener until shutdown

use axum::{body::Body, routing::any, Router};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::dispatch::dispatch;
use crate::load_balancer::{PoolError, RoundRobin};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub balancer: Arc<RoundRobin>,
    pub client: Client<HttpConnector, Body>,
    pub request_timeout: Option<Duration>,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    balancer: Arc<RoundRobin>,
}

impl HttpServer {
    /// Create a server whose pool comes from `config.backends`.
    pub fn new(config: &ProxyConfig) -> Result<Self, PoolError> {
        let balancer = Arc::new(RoundRobin::from_addresses(config.backends.iter().cloned())?);
        Ok(Self::with_balancer(config, balancer))
    }

    /// Create a server around an existing balancer handle.
    pub fn with_balancer(config: &ProxyConfig, balancer: Arc<RoundRobin>) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(config.timeouts.connect_secs.map(Duration::from_secs));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            balancer: balancer.clone(),
            client,
            request_timeout: config.timeouts.request_secs.map(Duration::from_secs),
        };

        Self {
            router: Self::build_router(state),
            balancer,
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The rotation this server dispatches through.
    pub fn balancer(&self) -> &Arc<RoundRobin> {
        &self.balancer
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until a
    /// shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
