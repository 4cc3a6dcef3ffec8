//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::Response,
    routing::any,
    Router,
};
use rr_proxy::config::ProxyConfig;
use rr_proxy::http::HttpServer;
use rr_proxy::lifecycle::Shutdown;
use tokio::net::TcpListener;

#[derive(Clone)]
struct Echo {
    name: String,
    delay: Duration,
}

/// Reply with everything the backend saw.
///
/// Body: `name|METHOD|path?query|request body`. The `x-reply-status` request
/// header picks the status code.
async fn echo(
    State(echo): State<Echo>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !echo.delay.is_zero() {
        tokio::time::sleep(echo.delay).await;
    }

    let status = headers
        .get("x-reply-status")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u16>().ok())
        .and_then(|v| StatusCode::from_u16(v).ok())
        .unwrap_or(StatusCode::OK);

    let seen = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };

    let path_and_query = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    let text = format!(
        "{}|{}|{}|{}",
        echo.name,
        method,
        path_and_query,
        String::from_utf8_lossy(&body)
    );

    Response::builder()
        .status(status)
        .header("x-backend", echo.name.as_str())
        .header("x-seen-host", seen("host"))
        .header("x-seen-custom", seen("x-custom"))
        .header("x-seen-forwarded-for", seen("x-forwarded-for"))
        .body(Body::from(text))
        .unwrap()
}

/// Start an echo backend on an ephemeral port.
pub async fn start_echo_backend(name: &str) -> SocketAddr {
    start_backend(name, Duration::ZERO).await
}

/// Start an echo backend that waits `delay` before answering.
pub async fn start_slow_backend(name: &str, delay: Duration) -> SocketAddr {
    start_backend(name, delay).await
}

async fn start_backend(name: &str, delay: Duration) -> SocketAddr {
    let state = Echo {
        name: name.to_string(),
        delay,
    };
    let app = Router::new()
        .route("/", any(echo))
        .route("/{*path}", any(echo))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// An address nothing listens on.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A running proxy; dropping it does not stop the server, call `stop`.
pub struct Proxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Proxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

/// Start a proxy for the given config on an ephemeral port.
pub async fn start_proxy(config: ProxyConfig) -> Proxy {
    let server = HttpServer::new(&config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Proxy { addr, shutdown }
}

/// Config whose pool is exactly `backends`, in order.
pub fn config_for(backends: Vec<String>) -> ProxyConfig {
    ProxyConfig {
        backends,
        ..ProxyConfig::default()
    }
}

pub fn http(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
