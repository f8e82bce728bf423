//! Narrative Radar binary entrypoint.
//! Boots the Axum HTTP server around the narrative engine.
//!
//! See `README.md` for quickstart.

use narrative_radar::api::{create_router, AppState};
use narrative_radar::config::EngineConfig;
use narrative_radar::engine::NarrativeEngine;
use narrative_radar::metrics::Metrics;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("narrative_radar=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();

    // --- Engine configuration (defaults unless config/engine.toml says otherwise) ---
    let config = EngineConfig::load()?;
    let engine = NarrativeEngine::new(config.cluster_params());
    info!(params = ?engine.params(), "engine configured");

    // Prometheus recorder must install before any counter fires.
    let metrics = Metrics::init();

    let state = AppState::new(engine);
    let router = create_router(state).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
