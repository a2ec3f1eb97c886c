//! Liveness endpoint.
//!
//! Deploy platforms probe a plain HTTP route to keep the bot alive. It
//! runs on its own task and never touches the dispatcher.

use axum::{Router, routing::get};
use tokio::net::TcpListener;

/// Binds the liveness route and serves it until the process exits.
pub async fn run(port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "health endpoint listening");
    serve(listener).await
}

async fn serve(listener: TcpListener) -> anyhow::Result<()> {
    let app = Router::new().route("/", get(|| async { "droplink bot is alive" }));
    axum::serve(listener, app).await?;
    Ok(())
}
