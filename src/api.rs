use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use metrics::{counter, histogram};
use tower_http::cors::CorsLayer;

use crate::engine::NarrativeEngine;
use crate::ideas;
use crate::metrics::ensure_metrics_described;
use crate::narrative::Narrative;
use crate::scorer::{self, DEFAULT_TOP_KEYWORDS};
use crate::signal::{ProcessedSignal, Signal};

#[derive(Clone)]
pub struct AppState {
    engine: Arc<NarrativeEngine>,
}

impl AppState {
    pub fn new(engine: NarrativeEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    ensure_metrics_described();

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .route("/signals/process", post(process))
        .route("/signals/anomalies", post(anomalies))
        .route("/signals/keywords", post(top_keywords))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Validation failures map to 400 with the error text; nothing else in the
/// core fails for well-formed input.
type ApiError = (StatusCode, String);

fn bad_request(e: impl std::fmt::Display) -> ApiError {
    counter!("analyze_rejected_total").increment(1);
    (StatusCode::BAD_REQUEST, e.to_string())
}

/// Full pipeline: score, cluster, rank; ideas attached to each narrative.
async fn analyze(
    State(state): State<AppState>,
    Json(signals): Json<Vec<Signal>>,
) -> Result<Json<Vec<Narrative>>, ApiError> {
    let started = Instant::now();
    let batch_size = signals.len();

    let mut narratives = state
        .engine
        .analyze(signals, current_millis())
        .map_err(bad_request)?;
    for n in &mut narratives {
        n.ideas = ideas::generate_ideas(n);
    }

    counter!("analyze_runs_total").increment(1);
    counter!("analyze_signals_total").increment(batch_size as u64);
    counter!("narratives_emitted_total").increment(narratives.len() as u64);
    histogram!("analyze_duration_ms").record(started.elapsed().as_secs_f64() * 1000.0);

    Ok(Json(narratives))
}

/// Scoring stage only: the ranked batch with per-signal components.
async fn process(
    Json(signals): Json<Vec<Signal>>,
) -> Result<Json<Vec<ProcessedSignal>>, ApiError> {
    let processed =
        scorer::process_signals(signals, current_millis()).map_err(bad_request)?;
    Ok(Json(processed))
}

/// Signals carrying statistically over-represented keywords.
async fn anomalies(Json(signals): Json<Vec<Signal>>) -> Json<Vec<Signal>> {
    Json(scorer::detect_anomalies(&signals))
}

/// Top keywords by accumulated combined score over the batch.
async fn top_keywords(
    Json(signals): Json<Vec<Signal>>,
) -> Result<Json<Vec<scorer::KeywordScore>>, ApiError> {
    let processed =
        scorer::process_signals(signals, current_millis()).map_err(bad_request)?;
    Ok(Json(scorer::extract_top_keywords(
        &processed,
        DEFAULT_TOP_KEYWORDS,
    )))
}

fn current_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
