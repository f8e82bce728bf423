// src/ideas.rs
//! # Idea Generator
//!
//! Maps a finished narrative to a small list of templated follow-on
//! suggestions. Pure template substitution, deterministic per input; runs
//! strictly after clustering as a consumer of `Narrative`.

use serde::{Deserialize, Serialize};

use crate::narrative::Narrative;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

/// One templated suggestion derived from a narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeIdea {
    pub title: String,
    pub description: String,
    pub reasoning: String,
    pub target_audience: String,
    pub difficulty: Difficulty,
    pub impact: Impact,
}

/// Produce follow-on ideas for a narrative. Strength of the narrative
/// (multi-source, high velocity) upgrades the builder idea's impact.
pub fn generate_ideas(narrative: &Narrative) -> Vec<NarrativeIdea> {
    let topic = narrative
        .keywords
        .first()
        .map(String::as_str)
        .unwrap_or("the ecosystem");
    let theme = narrative.theme_prefix();

    let builder_impact = if narrative.metrics.cross_source_count >= 3 {
        Impact::High
    } else {
        Impact::Medium
    };

    let mut ideas = vec![
        NarrativeIdea {
            title: format!("Build tooling around {topic}"),
            description: format!(
                "Ship a developer-facing utility or integration targeting {topic}, \
                 riding the current {theme} momentum."
            ),
            reasoning: format!(
                "{} signals across {} source categories indicate sustained builder \
                 attention on this narrative.",
                narrative.signals.len(),
                narrative.metrics.cross_source_count
            ),
            target_audience: "protocol developers".into(),
            difficulty: Difficulty::Medium,
            impact: builder_impact,
        },
        NarrativeIdea {
            title: format!("Publish a deep-dive on {topic}"),
            description: format!(
                "Write an explainer covering why {topic} activity is accelerating \
                 and which teams are driving it."
            ),
            reasoning: "Early, well-researched content on an emerging narrative \
                        captures outsized distribution."
                .into(),
            target_audience: "researchers and content creators".into(),
            difficulty: Difficulty::Low,
            impact: Impact::Medium,
        },
    ];

    // fast-moving narratives also warrant a data product
    if narrative.metrics.velocity >= 1.5 {
        ideas.push(NarrativeIdea {
            title: format!("Track {topic} metrics in a live dashboard"),
            description: format!(
                "Stand up a dashboard charting {topic} adoption before the trend \
                 peaks."
            ),
            reasoning: format!(
                "Velocity of {:.1} means the recent window is outpacing the prior \
                 one; observers will want numbers.",
                narrative.metrics.velocity
            ),
            target_audience: "analysts and power users".into(),
            difficulty: Difficulty::Medium,
            impact: Impact::Medium,
        });
    }

    ideas
}
