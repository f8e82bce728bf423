use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("analyze_runs_total", "Analysis pipeline invocations.");
        describe_counter!("analyze_signals_total", "Signals accepted into analysis runs.");
        describe_counter!(
            "analyze_rejected_total",
            "Batches rejected for malformed input."
        );
        describe_counter!("narratives_emitted_total", "Narratives returned to callers.");
        describe_counter!(
            "collect_signals_total",
            "Signals gathered from collector sources."
        );
        describe_counter!(
            "collect_dedup_total",
            "Signals dropped as duplicate ids during collection."
        );
        describe_counter!("collect_source_errors_total", "Collector fetch errors.");
        describe_histogram!("analyze_duration_ms", "Analysis run time in milliseconds.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and describe all series.
    pub fn init() -> Self {
        // Use default buckets to avoid API differences across crate versions.
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        ensure_metrics_described();

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
