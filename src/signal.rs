// src/signal.rs
//! # Signal Data Model
//!
//! Raw and scored signal records flowing through the analysis pipeline.
//!
//! - `Signal`: one atomic, immutable observation from a collector.
//! - `ProcessedSignal`: a signal plus per-batch derived scores. These are
//!   recomputed on every run and only meaningful relative to their batch.
//! - `SignalError`: the only error class the core surfaces (malformed input).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Upper bound on keywords carried by a single signal. Collectors tag
/// generously; anything past this is malformed input, not a bigger batch.
pub const MAX_KEYWORDS_PER_SIGNAL: usize = 25;

/// Fixed set of collector source categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceCategory {
    RepositoryActivity,
    OnChainActivity,
    SocialPost,
    Article,
    ForumPost,
}

impl SourceCategory {
    /// Human-readable label used in narrative descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            SourceCategory::RepositoryActivity => "repository activity",
            SourceCategory::OnChainActivity => "on-chain activity",
            SourceCategory::SocialPost => "social posts",
            SourceCategory::Article => "articles",
            SourceCategory::ForumPost => "forum posts",
        }
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Optional collector-provided context attached to a signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Named numeric metrics (stars, volume, replies, ...).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metrics: HashMap<String, f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// One atomic observation from one data source. Immutable once collected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub source: SourceCategory,
    /// Collection or publication time, milliseconds since epoch.
    pub timestamp_ms: i64,
    /// Free-text content summary.
    pub content: String,
    #[serde(default)]
    pub metadata: SignalMetadata,
    /// Lowercase keyword tags, order-irrelevant, bounded.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Source-assigned importance, typically 0.5–5.0, unbounded above.
    pub weight: f32,
}

/// Malformed-input taxonomy. Degenerate statistics (empty batches,
/// zero-variance weights) are defined edge cases, never errors.
#[derive(Debug, Error, PartialEq)]
pub enum SignalError {
    #[error("signal `{id}`: weight must be finite and non-negative, got {weight}")]
    InvalidWeight { id: String, weight: f32 },
    #[error("signal `{id}`: {count} keywords exceeds the {max} limit")]
    TooManyKeywords { id: String, count: usize, max: usize },
}

impl Signal {
    /// Fail fast on malformed input rather than letting NaN propagate
    /// through the batch scores.
    pub fn validate(&self) -> Result<(), SignalError> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(SignalError::InvalidWeight {
                id: self.id.clone(),
                weight: self.weight,
            });
        }
        if self.keywords.len() > MAX_KEYWORDS_PER_SIGNAL {
            return Err(SignalError::TooManyKeywords {
                id: self.id.clone(),
                count: self.keywords.len(),
                max: MAX_KEYWORDS_PER_SIGNAL,
            });
        }
        Ok(())
    }

    /// Age relative to `now_ms`, in fractional days. Negative for
    /// future-dated signals.
    pub fn age_days(&self, now_ms: i64) -> f32 {
        (now_ms - self.timestamp_ms) as f32 / MS_PER_DAY
    }
}

pub(crate) const MS_PER_DAY: f32 = 86_400_000.0;

/// A signal augmented with per-batch derived scores. Not persisted; valid
/// only relative to the batch it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedSignal {
    #[serde(flatten)]
    pub signal: Signal,
    /// Min-max normalized weight within the batch, in [0, 1].
    pub normalized_weight: f32,
    /// Exponential decay of age; > 1.0 allowed for future timestamps.
    pub recency_score: f32,
    /// Mean distinct source-category count over the signal's keywords.
    pub cross_source_score: f32,
}

/// Blend weights for the combined score. Recency dominates slightly.
pub const WEIGHT_SHARE: f32 = 0.3;
pub const RECENCY_SHARE: f32 = 0.4;
pub const CROSS_SOURCE_SHARE: f32 = 0.3;

impl ProcessedSignal {
    /// Weighted blend used for batch ranking and keyword accumulation.
    pub fn combined_score(&self) -> f32 {
        WEIGHT_SHARE * self.normalized_weight
            + RECENCY_SHARE * self.recency_score
            + CROSS_SOURCE_SHARE * self.cross_source_score
    }

    /// Unweighted component sum; drives greedy cluster-assignment order.
    pub fn cluster_priority(&self) -> f32 {
        self.normalized_weight + self.recency_score + self.cross_source_score
    }
}
