// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod cluster;
pub mod collect;
pub mod config;
pub mod engine;
pub mod ideas;
pub mod keywords;
pub mod metrics;
pub mod narrative;
pub mod scorer;
pub mod signal;
pub mod themes;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::cluster::{cluster_signals, weighted_jaccard, ClusterParams, KeywordCluster};
pub use crate::engine::NarrativeEngine;
pub use crate::ideas::{generate_ideas, NarrativeIdea};
pub use crate::narrative::{Narrative, NarrativeMetrics};
pub use crate::scorer::{
    calculate_velocity, clean_keywords, detect_anomalies, extract_top_keywords, process_signals,
    KeywordScore,
};
pub use crate::signal::{ProcessedSignal, Signal, SignalError, SignalMetadata, SourceCategory};
