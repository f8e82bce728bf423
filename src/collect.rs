// src/collect.rs
//! Collector seam. Actual fetching (HTTP, RSS, chain RPC) lives in
//! external adapters implementing `SignalSource`; this module only
//! aggregates their output into one batch. A failing source is logged and
//! skipped: per-source failure reduces the input set, it never aborts
//! the run.

use anyhow::Result;
use metrics::counter;
use std::collections::HashSet;
use tracing::warn;

use crate::signal::Signal;

/// One upstream signal collector.
#[async_trait::async_trait]
pub trait SignalSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Signal>>;
    fn name(&self) -> &'static str;
}

/// Gather one batch from all sources, dropping duplicate signal ids
/// (first occurrence wins, source order).
pub async fn run_once(sources: &[Box<dyn SignalSource>]) -> Vec<Signal> {
    let mut raw: Vec<Signal> = Vec::new();
    for source in sources {
        match source.fetch_latest().await {
            Ok(mut batch) => raw.append(&mut batch),
            Err(e) => {
                warn!(error = ?e, source = source.name(), "source fetch failed, skipping");
                counter!("collect_source_errors_total").increment(1);
            }
        }
    }

    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let before = raw.len();
    raw.retain(|s| seen.insert(s.id.clone()));
    counter!("collect_signals_total").increment(raw.len() as u64);
    counter!("collect_dedup_total").increment((before - raw.len()) as u64);

    raw
}
