// src/scorer.rs
//! # Signal Scorer
//!
//! Transforms a raw batch of signals into a ranked batch of
//! `ProcessedSignal`s, and exposes anomaly detection plus ad-hoc velocity
//! queries. Pure logic, no I/O; `now_ms` is always passed in so runs are
//! reproducible and testable offline.
//!
//! Scores are batch-relative: normalized weight is min-maxed within the
//! batch, cross-source counts come from a keyword index built over the
//! whole batch. Re-running on the same batch with the same `now_ms` yields
//! identical output.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::keywords::is_stop_keyword;
use crate::signal::{ProcessedSignal, Signal, SignalError, SourceCategory, MS_PER_DAY};

/// Recency half-life control: score decays to near-zero after ~21 days.
const RECENCY_DECAY_DAYS: f32 = 7.0;

/// Default window for velocity queries.
pub const DEFAULT_VELOCITY_WINDOW_DAYS: f32 = 7.0;

/// Default cut for `extract_top_keywords`.
pub const DEFAULT_TOP_KEYWORDS: usize = 30;

/// One keyword with its accumulated batch score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordScore {
    pub keyword: String,
    pub score: f32,
}

/// Remove stop-list keywords from every signal. Pure filter,
/// case-insensitive, no other mutation.
pub fn clean_keywords(signals: Vec<Signal>) -> Vec<Signal> {
    signals
        .into_iter()
        .map(|mut s| {
            s.keywords.retain(|k| !is_stop_keyword(k));
            s
        })
        .collect()
}

/// Score a batch: clean keywords, derive recency / cross-source /
/// normalized-weight components, sort descending by the combined score.
///
/// Empty input returns an empty batch. Malformed signals (non-finite or
/// negative weight, oversized keyword list) fail the whole batch fast.
pub fn process_signals(
    signals: Vec<Signal>,
    now_ms: i64,
) -> Result<Vec<ProcessedSignal>, SignalError> {
    for s in &signals {
        s.validate()?;
    }
    if signals.is_empty() {
        return Ok(Vec::new());
    }

    let cleaned = clean_keywords(signals);

    // keyword -> distinct source categories mentioning it, over the batch
    let mut categories_by_keyword: HashMap<&str, HashSet<SourceCategory>> = HashMap::new();
    for s in &cleaned {
        for k in &s.keywords {
            categories_by_keyword
                .entry(k.as_str())
                .or_default()
                .insert(s.source);
        }
    }

    let (min_w, max_w) = cleaned.iter().fold((f32::MAX, f32::MIN), |(lo, hi), s| {
        (lo.min(s.weight), hi.max(s.weight))
    });
    let spread = max_w - min_w;

    let mut processed: Vec<ProcessedSignal> = cleaned
        .iter()
        .map(|s| {
            let recency_score = (-s.age_days(now_ms) / RECENCY_DECAY_DAYS).exp();
            let cross_source_score = if s.keywords.is_empty() {
                0.0
            } else {
                let total: usize = s
                    .keywords
                    .iter()
                    .map(|k| categories_by_keyword.get(k.as_str()).map_or(0, HashSet::len))
                    .sum();
                total as f32 / s.keywords.len() as f32
            };
            // All-equal weights stay neutral instead of dividing by zero.
            let normalized_weight = if spread > 0.0 {
                (s.weight - min_w) / spread
            } else {
                0.5
            };
            ProcessedSignal {
                signal: s.clone(),
                normalized_weight,
                recency_score,
                cross_source_score,
            }
        })
        .collect();

    processed.sort_by(|a, b| {
        b.combined_score()
            .partial_cmp(&a.combined_score())
            .unwrap_or(Ordering::Equal)
    });

    debug!(
        batch = processed.len(),
        keywords = categories_by_keyword.len(),
        "signal batch scored"
    );
    Ok(processed)
}

/// Flag keywords whose batch frequency exceeds mean + 2·stddev and return
/// every signal carrying at least one flagged keyword.
///
/// A batch with no keywords at all yields no anomalies (the stddev guard
/// short-circuits before any division).
pub fn detect_anomalies(signals: &[Signal]) -> Vec<Signal> {
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for s in signals {
        for k in &s.keywords {
            *freq.entry(k.as_str()).or_insert(0) += 1;
        }
    }
    if freq.is_empty() {
        return Vec::new();
    }

    let n = freq.len() as f32;
    let mean = freq.values().sum::<usize>() as f32 / n;
    let variance = freq
        .values()
        .map(|&f| {
            let d = f as f32 - mean;
            d * d
        })
        .sum::<f32>()
        / n;
    let threshold = mean + 2.0 * variance.sqrt();

    let flagged: HashSet<&str> = freq
        .iter()
        .filter(|(_, &f)| f as f32 > threshold)
        .map(|(&k, _)| k)
        .collect();
    if flagged.is_empty() {
        return Vec::new();
    }

    signals
        .iter()
        .filter(|s| s.keywords.iter().any(|k| flagged.contains(k.as_str())))
        .cloned()
        .collect()
}

/// Ratio of signals mentioning `keyword` in the most recent window vs. the
/// preceding equal-length window. An empty older window yields 2.0 when
/// the recent window has matches, 0.0 otherwise.
pub fn calculate_velocity(
    signals: &[Signal],
    keyword: &str,
    window_days: f32,
    now_ms: i64,
) -> f32 {
    let window_ms = (window_days * MS_PER_DAY) as i64;
    let mut recent = 0usize;
    let mut older = 0usize;

    for s in signals {
        if !s.keywords.iter().any(|k| k == keyword) {
            continue;
        }
        let age_ms = now_ms - s.timestamp_ms;
        if age_ms <= window_ms {
            // future-dated signals count as recent
            recent += 1;
        } else if age_ms <= 2 * window_ms {
            older += 1;
        }
    }

    if older == 0 {
        if recent > 0 {
            2.0
        } else {
            0.0
        }
    } else {
        recent as f32 / older as f32
    }
}

/// Accumulate each keyword's total combined score over the signals that
/// carry it; return the `top_n` keywords descending, ties in first-seen
/// order.
pub fn extract_top_keywords(processed: &[ProcessedSignal], top_n: usize) -> Vec<KeywordScore> {
    let mut totals: HashMap<&str, f32> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for p in processed {
        let score = p.combined_score();
        for k in &p.signal.keywords {
            let entry = totals.entry(k.as_str()).or_insert_with(|| {
                first_seen.push(k.as_str());
                0.0
            });
            *entry += score;
        }
    }

    let mut ranked: Vec<KeywordScore> = first_seen
        .into_iter()
        .map(|k| KeywordScore {
            keyword: k.to_string(),
            score: totals[k],
        })
        .collect();
    // stable sort keeps first-seen order among equal scores
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(top_n);
    ranked
}
