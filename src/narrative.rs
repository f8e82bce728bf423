// src/narrative.rs
//! Externally visible narrative output types. Narratives are the only
//! entities that survive an analysis run; everything upstream
//! (`ProcessedSignal`, `KeywordCluster`) is transient.

use serde::{Deserialize, Serialize};

use crate::ideas::NarrativeIdea;
use crate::signal::Signal;

/// Aggregate metrics describing a narrative's footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeMetrics {
    /// Distinct source categories among contributing signals.
    pub cross_source_count: usize,
    /// Recent-vs-older signal count ratio (7-day windows).
    pub velocity: f32,
    /// Exponential decay of the mean signal age.
    pub recency: f32,
    /// High-weight social-post signals backing the narrative.
    pub key_voice_mentions: usize,
}

/// A cluster of related signals presented as one coherent emerging theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Contributing signals, assignment order.
    pub signals: Vec<Signal>,
    /// Cluster centroid keywords, ranked, truncated.
    pub keywords: Vec<String>,
    /// Composite score; already penalized for single-source narratives.
    pub score: f32,
    pub metrics: NarrativeMetrics,
    /// Milliseconds since epoch.
    pub created_at_ms: i64,
    /// Populated by the idea generator after clustering; empty before.
    #[serde(default)]
    pub ideas: Vec<NarrativeIdea>,
}

impl Narrative {
    /// Lowercase alphabetic-only form used for exact-duplicate detection.
    pub fn normalized_title(&self) -> String {
        self.title
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect()
    }

    /// Text before the first colon; narratives are capped per theme prefix.
    pub fn theme_prefix(&self) -> &str {
        self.title
            .split_once(':')
            .map(|(prefix, _)| prefix)
            .unwrap_or(&self.title)
            .trim()
    }
}
