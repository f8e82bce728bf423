// src/engine.rs
//! # Narrative Engine
//! Pure, testable pipeline that maps a raw signal batch → ranked
//! narratives. No I/O, no shared state; one deterministic pass per
//! invocation, safe to treat as a pure function by concurrent hosts.
//!
//! Stages: score (scorer) → greedy cluster (cluster) → compose narrative
//! per surviving cluster → dedup by title/theme → penalize single-source
//! narratives → rank and cap.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use once_cell::sync::Lazy;
use tracing::debug;
use uuid::Uuid;

use crate::cluster::{cluster_signals, ClusterParams, KeywordCluster};
use crate::keywords::{is_ecosystem_term, is_noisy_keyword};
use crate::narrative::{Narrative, NarrativeMetrics};
use crate::scorer::process_signals;
use crate::signal::{Signal, SignalError, SourceCategory, MS_PER_DAY};
use crate::themes::{identify_theme, theme_context, theme_name_words};

/// Mean-age decay horizon for narrative recency (slower than the
/// per-signal decay; narratives aggregate older material).
const NARRATIVE_RECENCY_DECAY_DAYS: f32 = 10.0;

/// Window for the narrative velocity ratio.
const VELOCITY_WINDOW_DAYS: f32 = 7.0;

/// Social posts at or above this weight count as key voices.
const KEY_VOICE_MIN_WEIGHT: f32 = 2.5;

/// Multiplicative discount for narratives backed by a single source
/// category. Heavy, but not exclusion.
const SINGLE_SOURCE_PENALTY: f32 = 0.4;

/// Deterministic title suffixes, selected by the char code of the
/// formatted keyword's first letter.
const TITLE_SUFFIXES: [&str; 6] = ["Growth", "Momentum", "Surge", "Wave", "Expansion", "Rise"];

/// Words too generic to headline a narrative title.
static GENERIC_TITLE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "solana", "crypto", "blockchain", "web3", "protocol", "network",
        "ecosystem", "token", "tokens", "project", "platform", "chain",
        "community", "market",
    ]
    .into_iter()
    .collect()
});

/// Batch-in, narratives-out. Holds only immutable parameters; every run
/// is independent.
#[derive(Debug, Clone)]
pub struct NarrativeEngine {
    params: ClusterParams,
}

impl Default for NarrativeEngine {
    fn default() -> Self {
        Self::new(ClusterParams::default())
    }
}

impl NarrativeEngine {
    pub fn new(params: ClusterParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ClusterParams {
        &self.params
    }

    /// Full pipeline for one batch. `now_ms` anchors every age-dependent
    /// score; pass the same value to reproduce a run exactly (narrative
    /// ids aside). Ideas are left empty; the idea generator runs
    /// downstream.
    pub fn analyze(&self, signals: Vec<Signal>, now_ms: i64) -> Result<Vec<Narrative>, SignalError> {
        let processed = process_signals(signals, now_ms)?;
        let clusters = cluster_signals(processed, &self.params);
        let mut narratives: Vec<Narrative> = clusters
            .into_iter()
            .map(|c| compose_narrative(&c, now_ms))
            .collect();

        narratives = dedup_narratives(narratives);
        narratives = rank_and_cap(narratives, self.params.max_narratives);

        debug!(narratives = narratives.len(), "analysis run complete");
        Ok(narratives)
    }
}

/// Build the externally visible narrative for one surviving cluster.
fn compose_narrative(cluster: &KeywordCluster, now_ms: i64) -> Narrative {
    let centroid_top5: Vec<String> = cluster.centroid.iter().take(5).cloned().collect();
    let theme = identify_theme(&centroid_top5);
    let title = compose_title(theme, &cluster.centroid);
    let metrics = narrative_metrics(cluster, now_ms);
    let description = compose_description(cluster, theme, &centroid_top5);
    let score = narrative_score(&metrics, cluster.members.len());

    Narrative {
        id: Uuid::new_v4().to_string(),
        title,
        description,
        signals: cluster.members.iter().map(|m| m.signal.clone()).collect(),
        keywords: cluster.centroid.clone(),
        score,
        metrics,
        created_at_ms: now_ms,
        ideas: Vec::new(),
    }
}

/// Pick the keyword that headlines the title. Preference chain:
/// 1. first centroid keyword that is specific (not generic, not part of
///    the theme name, not noisy) and recognizable (ecosystem term, or
///    hyphenated and longer than 5 chars);
/// 2. any ecosystem term in the centroid;
/// 3. the first centroid keyword;
/// 4. the literal "ecosystem".
fn distinct_keyword<'a>(theme: &str, centroid: &'a [String]) -> &'a str {
    let theme_words = theme_name_words(theme);
    let overlaps_theme = |kw: &str| {
        theme_words
            .iter()
            .any(|w| kw.contains(w.as_str()) || w.contains(kw))
    };

    centroid
        .iter()
        .find(|kw| {
            !GENERIC_TITLE_WORDS.contains(kw.as_str())
                && !overlaps_theme(kw)
                && !is_noisy_keyword(kw)
                && (is_ecosystem_term(kw) || (kw.contains('-') && kw.len() > 5))
        })
        .or_else(|| centroid.iter().find(|kw| is_ecosystem_term(kw)))
        .or_else(|| centroid.first())
        .map(String::as_str)
        .unwrap_or("ecosystem")
}

/// Hyphens become spaces, every word capitalized.
fn format_title_keyword(keyword: &str) -> String {
    keyword
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stable pseudo-random suffix: char code of the formatted keyword's
/// first letter, modulo the suffix list. Deterministic per input.
fn title_suffix(formatted: &str) -> &'static str {
    let code = formatted.chars().next().map(|c| c as usize).unwrap_or(0);
    TITLE_SUFFIXES[code % TITLE_SUFFIXES.len()]
}

fn compose_title(theme: &str, centroid: &[String]) -> String {
    let formatted = format_title_keyword(distinct_keyword(theme, centroid));
    let suffix = title_suffix(&formatted);
    format!("{theme}: {formatted} {suffix}")
}

fn compose_description(cluster: &KeywordCluster, theme: &str, top_keywords: &[String]) -> String {
    // BTreeSet gives a stable, ordered source list
    let sources: BTreeSet<&'static str> = cluster
        .members
        .iter()
        .map(|m| m.signal.source.label())
        .collect();
    let source_list = sources.into_iter().collect::<Vec<_>>().join(", ");

    format!(
        "{count} related signals across {sources} point to rising activity here. \
         Key terms: {keywords}. {context}",
        count = cluster.members.len(),
        sources = source_list,
        keywords = top_keywords.join(", "),
        context = theme_context(theme),
    )
}

fn narrative_metrics(cluster: &KeywordCluster, now_ms: i64) -> NarrativeMetrics {
    let members = &cluster.members;

    let categories: HashSet<SourceCategory> = members.iter().map(|m| m.signal.source).collect();

    let window_ms = (VELOCITY_WINDOW_DAYS * MS_PER_DAY) as i64;
    let mut recent = 0usize;
    let mut older = 0usize;
    for m in members {
        let age_ms = now_ms - m.signal.timestamp_ms;
        if age_ms <= window_ms {
            recent += 1;
        } else if age_ms <= 2 * window_ms {
            older += 1;
        }
    }
    // a dead older window means the narrative just appeared: hot if the
    // recent window has anything, neutral otherwise
    let velocity = if older == 0 {
        if recent > 0 {
            2.0
        } else {
            1.0
        }
    } else {
        recent as f32 / older as f32
    };

    let mean_ts = members
        .iter()
        .map(|m| m.signal.timestamp_ms as f64)
        .sum::<f64>()
        / members.len() as f64;
    let mean_age_days = (now_ms as f64 - mean_ts) as f32 / MS_PER_DAY;
    let recency = (-mean_age_days / NARRATIVE_RECENCY_DECAY_DAYS).exp();

    let key_voice_mentions = members
        .iter()
        .filter(|m| {
            m.signal.source == SourceCategory::SocialPost
                && m.signal.weight >= KEY_VOICE_MIN_WEIGHT
        })
        .count();

    NarrativeMetrics {
        cross_source_count: categories.len(),
        velocity,
        recency,
        key_voice_mentions,
    }
}

fn narrative_score(metrics: &NarrativeMetrics, signal_count: usize) -> f32 {
    20.0 * metrics.cross_source_count as f32
        + 15.0 * metrics.velocity
        + 20.0 * metrics.recency
        + 5.0 * metrics.key_voice_mentions as f32
        + (signal_count as f32 / 2.0).min(15.0)
}

/// Drop exact-duplicate titles (lowercase alphabetic comparison) and cap
/// each theme prefix at two narratives, scanning in descending score
/// order so the strongest variants survive.
fn dedup_narratives(mut narratives: Vec<Narrative>) -> Vec<Narrative> {
    narratives.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut theme_counts: HashMap<String, usize> = HashMap::new();
    let mut kept = Vec::with_capacity(narratives.len());

    for n in narratives {
        if !seen_titles.insert(n.normalized_title()) {
            continue;
        }
        let count = theme_counts.entry(n.theme_prefix().to_string()).or_insert(0);
        if *count >= 2 {
            continue;
        }
        *count += 1;
        kept.push(n);
    }
    kept
}

/// Apply the single-source penalty, re-sort by the adjusted score, keep
/// the top `max_narratives`.
fn rank_and_cap(mut narratives: Vec<Narrative>, max_narratives: usize) -> Vec<Narrative> {
    for n in &mut narratives {
        if n.metrics.cross_source_count < 2 {
            n.score *= SINGLE_SOURCE_PENALTY;
        }
    }
    narratives.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    narratives.truncate(max_narratives);
    narratives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalMetadata;

    const DAY_MS: i64 = 86_400_000;
    const NOW: i64 = 1_700_000_000_000;

    fn sig(id: &str, source: SourceCategory, age_days: i64, weight: f32, kws: &[&str]) -> Signal {
        Signal {
            id: id.into(),
            source,
            timestamp_ms: NOW - age_days * DAY_MS,
            content: format!("content {id}"),
            metadata: SignalMetadata::default(),
            keywords: kws.iter().map(|s| s.to_string()).collect(),
            weight,
        }
    }

    #[test]
    fn title_keyword_formatting_and_suffix_are_deterministic() {
        assert_eq!(format_title_keyword("liquid-staking"), "Liquid Staking");
        assert_eq!(format_title_keyword("jupiter"), "Jupiter");
        // 'J' = 74, 74 % 6 = 2 -> "Surge"
        assert_eq!(title_suffix("Jupiter"), "Surge");
        // 'M' = 77, 77 % 6 = 5 -> "Rise"
        assert_eq!(title_suffix("Marinade"), "Rise");
    }

    #[test]
    fn distinct_keyword_skips_generic_and_theme_words() {
        let centroid: Vec<String> = ["solana", "defi", "jupiter", "swap"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        // "solana" is generic, "defi" overlaps the DeFi theme name
        assert_eq!(distinct_keyword("DeFi", &centroid), "jupiter");
    }

    #[test]
    fn distinct_keyword_falls_back_to_literal_ecosystem() {
        assert_eq!(distinct_keyword("DeFi", &[]), "ecosystem");
    }

    #[test]
    fn small_batches_produce_no_narratives() {
        let engine = NarrativeEngine::default();
        let batch = vec![
            sig("a", SourceCategory::Article, 1, 1.0, &["jupiter", "dex"]),
            sig("b", SourceCategory::SocialPost, 1, 1.0, &["jupiter", "dex"]),
        ];
        assert!(engine.analyze(batch, NOW).unwrap().is_empty());
    }

    #[test]
    fn related_multi_source_signals_become_one_narrative() {
        let engine = NarrativeEngine::default();
        let batch = vec![
            sig("a", SourceCategory::Article, 1, 1.0, &["jupiter", "dex", "swap", "defi"]),
            sig("b", SourceCategory::SocialPost, 2, 2.0, &["jupiter", "dex", "aggregator", "defi"]),
            sig("c", SourceCategory::OnChainActivity, 1, 1.5, &["jupiter", "swap", "trading", "defi"]),
        ];
        let out = engine.analyze(batch, NOW).unwrap();
        assert_eq!(out.len(), 1);
        let n = &out[0];
        assert!(n.keywords.contains(&"jupiter".to_string()));
        assert_eq!(n.metrics.cross_source_count, 3);
        assert_eq!(n.signals.len(), 3);
        assert!(n.ideas.is_empty(), "ideas are populated downstream");
    }

    #[test]
    fn single_source_narrative_scores_below_multi_source() {
        // comparable clusters: same ages and weights, different source spread
        let single = vec![
            sig("s1", SourceCategory::ForumPost, 1, 1.0, &["helium", "depin", "wireless"]),
            sig("s2", SourceCategory::ForumPost, 2, 1.0, &["helium", "depin", "coverage"]),
            sig("s3", SourceCategory::ForumPost, 3, 1.0, &["helium", "depin", "hotspot"]),
        ];
        let multi = vec![
            sig("m1", SourceCategory::Article, 1, 1.0, &["tensor", "nfts", "royalties"]),
            sig("m2", SourceCategory::SocialPost, 2, 1.0, &["tensor", "nfts", "volume"]),
            sig("m3", SourceCategory::OnChainActivity, 3, 1.0, &["tensor", "nfts", "mint"]),
        ];
        let engine = NarrativeEngine::default();
        let batch: Vec<Signal> = single.into_iter().chain(multi).collect();
        let out = engine.analyze(batch, NOW).unwrap();
        assert_eq!(out.len(), 2);

        let multi_n = out
            .iter()
            .find(|n| n.metrics.cross_source_count == 3)
            .expect("multi-source narrative present");
        let single_n = out
            .iter()
            .find(|n| n.metrics.cross_source_count == 1)
            .expect("single-source narrative present");
        assert!(multi_n.score > single_n.score);
        // penalized narrative ranks last
        assert_eq!(out.last().unwrap().metrics.cross_source_count, 1);
    }

    #[test]
    fn key_voices_require_weighty_social_posts() {
        let engine = NarrativeEngine::default();
        let batch = vec![
            sig("a", SourceCategory::SocialPost, 1, 3.0, &["jito", "liquid-staking", "yield"]),
            sig("b", SourceCategory::SocialPost, 1, 1.0, &["jito", "liquid-staking", "apy"]),
            sig("c", SourceCategory::Article, 2, 1.0, &["jito", "liquid-staking", "stake"]),
        ];
        let out = engine.analyze(batch, NOW).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].metrics.key_voice_mentions, 1);
    }

    #[test]
    fn duplicate_titles_are_dropped_keeping_the_stronger() {
        let mk = |id: &str, title: &str, score: f32, cross: usize| Narrative {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            signals: Vec::new(),
            keywords: Vec::new(),
            score,
            metrics: NarrativeMetrics {
                cross_source_count: cross,
                velocity: 1.0,
                recency: 0.5,
                key_voice_mentions: 0,
            },
            created_at_ms: NOW,
            ideas: Vec::new(),
        };
        let out = dedup_narratives(vec![
            mk("a", "DeFi: Jupiter Surge", 80.0, 3),
            mk("b", "DeFi: Jupiter Surge", 90.0, 3),
            mk("c", "DeFi: Kamino Wave", 70.0, 3),
            mk("d", "DeFi: Drift Rise", 60.0, 3),
        ]);
        // exact dup gone, theme "DeFi" capped at two
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, "b");
        assert_eq!(out[1].id, "c");
    }
}
