//! droplink bot entry point.

mod app;
mod config;
mod handler;
mod health;
mod sink;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Local development keeps secrets in a .env file.
    dotenvy::dotenv().ok();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting droplink bot"
    );

    // Load configuration.
    let mut config = config::Config::load()?;
    if let Ok(port) = std::env::var("PORT") {
        config.health_port = port.parse().context("PORT must be a port number")?;
    }

    let token = std::env::var("BOT_TOKEN").context("BOT_TOKEN must be set")?;

    // Build and run the tokio runtime.
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::run(config, token))?;

    tracing::info!("bot shut down cleanly");
    Ok(())
}
