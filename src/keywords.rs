// src/keywords.rs
//! # Keyword Lookup Tables & Normalization
//!
//! Fixed, process-wide lookup data driving keyword hygiene:
//!
//! - stop list: generic web/ecosystem noise stripped before scoring,
//! - filler list + username patterns: "noisy" keywords dropped before
//!   clustering,
//! - alias table: near-synonym terms folded to one canonical form,
//! - ecosystem terms: domain proper nouns given double weight in
//!   similarity and centroid computations.
//!
//! All tables are immutable statics initialized once; every branch is
//! data-driven string matching, no dynamic dispatch.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Generic web/boilerplate terms removed by `Scorer::clean_keywords`.
static STOP_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "http", "https", "www", "com", "org", "html", "href", "url", "link",
        "the", "and", "for", "with", "this", "that", "from", "have", "has",
        "will", "are", "was", "you", "your", "our", "their", "about", "into",
        "javascript", "typescript", "python", "rust", "github", "repo",
        "thread", "post", "tweet", "read", "click", "follow", "retweet",
        "gm", "wagmi",
    ]
    .into_iter()
    .collect()
});

/// Filler words that survive the stop list but carry no clustering value.
static FILLER_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "new", "news", "update", "updates", "launch", "launched", "live",
        "big", "huge", "good", "great", "best", "top", "more", "just",
        "soon", "today", "now", "announcement", "announcing", "release",
        "released", "thread", "alert", "breaking", "check", "join",
    ]
    .into_iter()
    .collect()
});

/// Near-synonym folding. Values are the canonical cluster vocabulary.
static KEYWORD_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("amm", "dex"),
        ("amms", "dex"),
        ("swap", "dex"),
        ("swaps", "dex"),
        ("trading", "dex"),
        ("dexes", "dex"),
        ("exchange", "dex"),
        ("lst", "liquid-staking"),
        ("lsts", "liquid-staking"),
        ("restaking", "liquid-staking"),
        ("nft", "nfts"),
        ("gamefi", "gaming"),
        ("game", "gaming"),
        ("games", "gaming"),
        ("ai-agent", "ai-agents"),
        ("agents", "ai-agents"),
        ("llm", "ai"),
        ("bridge", "cross-chain"),
        ("bridges", "cross-chain"),
        ("bridging", "cross-chain"),
        ("oracle", "oracles"),
        ("stablecoins", "stablecoin"),
        ("validators", "validator"),
        ("cnft", "compressed-nfts"),
        ("cnfts", "compressed-nfts"),
    ]
    .into_iter()
    .collect()
});

/// Domain-specific proper nouns and protocol names. Counted double in
/// weighted-Jaccard similarity and centroid frequency.
static ECOSYSTEM_TERMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "solana", "jupiter", "jito", "marinade", "sanctum", "raydium",
        "orca", "meteora", "phoenix", "openbook", "drift", "kamino",
        "marginfi", "mango", "zeta", "parcl", "tensor", "metaplex",
        "magic-eden", "pyth", "switchboard", "wormhole", "helium",
        "hivemapper", "render", "firedancer", "anchor", "phantom",
        "backpack", "squads", "dialect", "blinks", "token-extensions",
        "compressed-nfts", "depin", "mev", "rwa", "dex", "defi",
        "liquid-staking", "nfts", "oracles", "cross-chain", "ai-agents",
        "stablecoin", "validator", "solana-mobile", "saga",
    ]
    .into_iter()
    .collect()
});

/// Username-ish handles: lowercase letters then 3+ digits ("james09777").
static RE_HANDLE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+[0-9]{3,}$").expect("handle-suffix regex"));

/// Digit-led handles: digits then letters ("0xdegen", "420chad").
static RE_DIGIT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+[a-z][a-z0-9]*$").expect("digit-prefix regex"));

/// True for terms removed by the scorer's stop list.
pub fn is_stop_keyword(keyword: &str) -> bool {
    STOP_KEYWORDS.contains(keyword.to_ascii_lowercase().as_str())
}

/// True for short, numeric, username-like, or filler keywords that would
/// only smear clusters together.
pub fn is_noisy_keyword(keyword: &str) -> bool {
    if keyword.len() <= 2 {
        return true;
    }
    if keyword.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if RE_HANDLE_SUFFIX.is_match(keyword) || RE_DIGIT_PREFIX.is_match(keyword) {
        return true;
    }
    FILLER_KEYWORDS.contains(keyword)
}

/// True for recognized domain proper nouns / protocol names.
pub fn is_ecosystem_term(keyword: &str) -> bool {
    ECOSYSTEM_TERMS.contains(keyword)
}

/// Similarity/centroid weight: ecosystem terms count double.
pub fn term_weight(keyword: &str) -> f32 {
    if is_ecosystem_term(keyword) {
        2.0
    } else {
        1.0
    }
}

/// Normalize a signal's keyword set for clustering:
/// drop noisy terms, fold aliases to their canonical form (keeping the
/// original alongside when it is an ecosystem term or longer than 3
/// chars), dedup preserving first-seen order.
pub fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    fn push(term: String, out: &mut Vec<String>, seen: &mut HashSet<String>) {
        if seen.insert(term.clone()) {
            out.push(term);
        }
    }

    let mut out: Vec<String> = Vec::with_capacity(keywords.len());
    let mut seen: HashSet<String> = HashSet::with_capacity(keywords.len());

    for raw in keywords {
        let kw = raw.trim().to_ascii_lowercase();
        if is_noisy_keyword(&kw) {
            continue;
        }
        match KEYWORD_ALIASES.get(kw.as_str()) {
            Some(canonical) => {
                push(canonical.to_string(), &mut out, &mut seen);
                if is_ecosystem_term(&kw) || kw.len() > 3 {
                    push(kw, &mut out, &mut seen);
                }
            }
            None => push(kw, &mut out, &mut seen),
        }
    }
    out
}
