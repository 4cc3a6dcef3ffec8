use axum::{extract::State, http::Uri, routing::any, Router};
use clap::Parser;
use std::net::SocketAddr;

/// Tiny backend that answers every path with its own name, for trying the
/// load balancer by hand.
#[derive(Parser)]
#[command(name = "demo-backend")]
struct Cli {
    #[arg(short, long, default_value_t = 8001)]
    port: u16,

    #[arg(short, long, default_value = "backend")]
    name: String,
}

async fn answer(State(name): State<String>, uri: Uri) -> String {
    format!("Hello from {} ({})\n", name, uri)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let app = Router::new()
        .route("/", any(answer))
        .route("/{*path}", any(answer))
        .with_state(cli.name.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], cli.port));
    println!("{} is listening on http://{}", cli.name, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
