// src/cluster.rs
//! # Keyword Clusterer
//!
//! Greedy, single-pass grouping of scored signals into keyword clusters
//! using weighted Jaccard similarity. Assignment is final: no merging, no
//! re-assignment pass. Downstream code (the narrative engine) turns the
//! surviving clusters into ranked narratives.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::keywords::{normalize_keywords, term_weight};
use crate::signal::ProcessedSignal;

/// Clustering knobs. Fixed in the reference pipeline; the host config layer
/// may override them at startup but nothing mutates them at runtime.
#[derive(Debug, Clone, Copy)]
pub struct ClusterParams {
    /// Clusters below this size never become narratives.
    pub min_cluster_size: usize,
    /// Minimum weighted-Jaccard similarity for joining an existing cluster.
    pub similarity_threshold: f32,
    /// Hard cap on narratives emitted per run.
    pub max_narratives: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            min_cluster_size: 3,
            similarity_threshold: 0.25,
            max_narratives: 10,
        }
    }
}

/// Centroid length: the top keywords summarizing a cluster.
pub const CENTROID_SIZE: usize = 10;

/// Jaccard index where every keyword contributes `term_weight` (2.0 for
/// ecosystem terms) instead of a uniform 1. Symmetric, bounded in [0, 1];
/// identical non-empty sets score 1.0, an empty union scores 0.0.
pub fn weighted_jaccard(a: &[String], b: &[String]) -> f32 {
    let sa: HashSet<&str> = a.iter().map(String::as_str).collect();
    let sb: HashSet<&str> = b.iter().map(String::as_str).collect();

    let mut union_weight = 0.0f32;
    let mut intersection_weight = 0.0f32;
    for kw in sa.union(&sb) {
        let w = term_weight(kw);
        union_weight += w;
        if sa.contains(kw) && sb.contains(kw) {
            intersection_weight += w;
        }
    }
    if union_weight == 0.0 {
        0.0
    } else {
        intersection_weight / union_weight
    }
}

/// A transient cluster of related signals. Lives only for the duration of
/// one analysis run.
#[derive(Debug, Clone)]
pub struct KeywordCluster {
    /// Union of member keyword sets, first-seen order.
    pub keywords: Vec<String>,
    /// Member signals in assignment order.
    pub members: Vec<ProcessedSignal>,
    /// Top keywords by source-weighted frequency across members.
    pub centroid: Vec<String>,
    member_keywords: Vec<Vec<String>>,
    keyword_set: HashSet<String>,
}

impl KeywordCluster {
    fn seeded(signal: ProcessedSignal, normalized: Vec<String>) -> Self {
        let mut cluster = Self {
            keywords: Vec::new(),
            members: Vec::new(),
            centroid: Vec::new(),
            member_keywords: Vec::new(),
            keyword_set: HashSet::new(),
        };
        cluster.insert(signal, normalized);
        cluster
    }

    fn insert(&mut self, signal: ProcessedSignal, normalized: Vec<String>) {
        for kw in &normalized {
            if self.keyword_set.insert(kw.clone()) {
                self.keywords.push(kw.clone());
            }
        }
        self.members.push(signal);
        self.member_keywords.push(normalized);
        self.recompute_centroid();
    }

    /// Top-`CENTROID_SIZE` keywords by weighted frequency across members,
    /// descending; ties keep first-seen order (stable sort).
    fn recompute_centroid(&mut self) {
        let mut counts: HashMap<&str, f32> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for member in &self.member_keywords {
            for kw in member {
                let entry = counts.entry(kw.as_str()).or_insert_with(|| {
                    order.push(kw.as_str());
                    0.0
                });
                *entry += term_weight(kw);
            }
        }
        let mut ranked: Vec<&str> = order;
        ranked.sort_by(|a, b| {
            counts[b].partial_cmp(&counts[a]).unwrap_or(Ordering::Equal)
        });
        self.centroid = ranked
            .into_iter()
            .take(CENTROID_SIZE)
            .map(str::to_string)
            .collect();
    }
}

/// Greedy single-pass clustering over an already-scored batch.
///
/// Signals are visited in descending `normalized_weight + recency_score +
/// cross_source_score` order. Each joins the most similar existing cluster
/// when that similarity clears the threshold (first-encountered cluster
/// wins exact ties), otherwise seeds a new one. Clusters below
/// `min_cluster_size` are discarded at the end.
pub fn cluster_signals(
    processed: Vec<ProcessedSignal>,
    params: &ClusterParams,
) -> Vec<KeywordCluster> {
    if processed.len() < params.min_cluster_size {
        return Vec::new();
    }

    let mut items: Vec<(ProcessedSignal, Vec<String>)> = processed
        .into_iter()
        .map(|p| {
            let normalized = normalize_keywords(&p.signal.keywords);
            (p, normalized)
        })
        .collect();
    items.sort_by(|(a, _), (b, _)| {
        b.cluster_priority()
            .partial_cmp(&a.cluster_priority())
            .unwrap_or(Ordering::Equal)
    });

    let total = items.len();
    let mut clusters: Vec<KeywordCluster> = Vec::new();
    for (signal, normalized) in items {
        let mut best: Option<(usize, f32)> = None;
        for (idx, cluster) in clusters.iter().enumerate() {
            let sim = weighted_jaccard(&normalized, &cluster.keywords);
            if sim < params.similarity_threshold {
                continue;
            }
            // strict greater-than keeps the first-encountered cluster on ties
            match best {
                Some((_, best_sim)) if sim <= best_sim => {}
                _ => best = Some((idx, sim)),
            }
        }
        match best {
            Some((idx, _)) => clusters[idx].insert(signal, normalized),
            None => clusters.push(KeywordCluster::seeded(signal, normalized)),
        }
    }

    let formed = clusters.len();
    clusters.retain(|c| c.members.len() >= params.min_cluster_size);
    debug!(
        signals = total,
        formed,
        kept = clusters.len(),
        "greedy clustering finished"
    );
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{Signal, SignalMetadata, SourceCategory};

    fn processed(id: &str, source: SourceCategory, kws: &[&str]) -> ProcessedSignal {
        ProcessedSignal {
            signal: Signal {
                id: id.into(),
                source,
                timestamp_ms: 1_700_000_000_000,
                content: String::new(),
                metadata: SignalMetadata::default(),
                keywords: kws.iter().map(|s| s.to_string()).collect(),
                weight: 1.0,
            },
            normalized_weight: 0.5,
            recency_score: 0.9,
            cross_source_score: 1.0,
        }
    }

    fn owned(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn jaccard_is_symmetric_and_bounded() {
        let a = owned(&["jupiter", "dex", "defi"]);
        let b = owned(&["jupiter", "aggregator"]);
        let ab = weighted_jaccard(&a, &b);
        let ba = weighted_jaccard(&b, &a);
        assert!((ab - ba).abs() < 1e-6);
        assert!((0.0..=1.0).contains(&ab));
    }

    #[test]
    fn jaccard_identity_is_one() {
        let a = owned(&["jupiter", "dex"]);
        assert!((weighted_jaccard(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn jaccard_empty_union_is_zero() {
        assert_eq!(weighted_jaccard(&[], &[]), 0.0);
    }

    #[test]
    fn ecosystem_terms_dominate_similarity() {
        // shared ecosystem term (weight 2) vs shared plain term (weight 1)
        let eco = weighted_jaccard(&owned(&["jupiter", "foo"]), &owned(&["jupiter", "bar"]));
        let plain = weighted_jaccard(&owned(&["hello", "foo"]), &owned(&["hello", "bar"]));
        assert!(eco > plain);
    }

    #[test]
    fn tiny_batch_yields_no_clusters() {
        let batch = vec![
            processed("a", SourceCategory::Article, &["jupiter"]),
            processed("b", SourceCategory::Article, &["jupiter"]),
        ];
        assert!(cluster_signals(batch, &ClusterParams::default()).is_empty());
    }

    #[test]
    fn related_signals_form_one_cluster() {
        let batch = vec![
            processed("a", SourceCategory::Article, &["jupiter", "dex", "swap", "defi"]),
            processed("b", SourceCategory::SocialPost, &["jupiter", "dex", "aggregator", "defi"]),
            processed("c", SourceCategory::OnChainActivity, &["jupiter", "swap", "trading", "defi"]),
        ];
        let clusters = cluster_signals(batch, &ClusterParams::default());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 3);
        assert!(clusters[0].centroid.contains(&"jupiter".to_string()));
    }

    #[test]
    fn unrelated_singletons_are_discarded() {
        let batch = vec![
            processed("a", SourceCategory::Article, &["jupiter", "dex", "defi"]),
            processed("b", SourceCategory::Article, &["jupiter", "dex", "aggregator"]),
            processed("c", SourceCategory::Article, &["jupiter", "dex", "volume"]),
            processed("d", SourceCategory::ForumPost, &["helium", "depin", "hotspot"]),
        ];
        let clusters = cluster_signals(batch, &ClusterParams::default());
        assert_eq!(clusters.len(), 1, "the depin singleton must not survive");
        assert_eq!(clusters[0].members.len(), 3);
    }

    #[test]
    fn centroid_ranks_frequent_terms_first() {
        let batch = vec![
            processed("a", SourceCategory::Article, &["kamino", "lending", "yield"]),
            processed("b", SourceCategory::SocialPost, &["kamino", "lending", "vaults"]),
            processed("c", SourceCategory::ForumPost, &["kamino", "lending", "points"]),
        ];
        let clusters = cluster_signals(batch, &ClusterParams::default());
        assert_eq!(clusters.len(), 1);
        // kamino is an ecosystem term counted double, lending is shared by all
        assert_eq!(clusters[0].centroid[0], "kamino");
        assert_eq!(clusters[0].centroid[1], "lending");
    }
}
