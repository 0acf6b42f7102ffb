//! F1 Insight Server
//!
//! REST API for lap telemetry and track dominance comparisons

use anyhow::Result;
use clap::Parser;
use f1i_server::{api, config::Cli, state};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    info!("Starting F1 Insight Server");

    let config = cli.into_config()?;
    let addr = config.bind;

    // Create application state
    let state = state::AppState::from_config(config);

    // Build the router
    let app = api::create_router(state);

    // Start server
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
