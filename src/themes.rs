// src/themes.rs
//! # Theme Table
//!
//! Fixed mapping from cluster keywords to a named theme, plus one canned
//! context sentence per theme for narrative descriptions. Matching is
//! substring-based in either direction; the table order breaks ties
//! (first entry wins on strict greater-than).

use once_cell::sync::Lazy;

/// Fallback theme when no table entry matches.
pub const DEFAULT_THEME: &str = "Emerging Technology";

struct Theme {
    name: &'static str,
    terms: &'static [&'static str],
    context: &'static str,
}

static THEMES: Lazy<Vec<Theme>> = Lazy::new(|| {
    vec![
        Theme {
            name: "DeFi",
            terms: &[
                "defi", "dex", "lending", "yield", "liquidity", "perps",
                "derivatives", "stablecoin", "borrowing", "vaults",
            ],
            context: "DeFi protocols continue to drive the bulk of on-chain volume and fee revenue.",
        },
        Theme {
            name: "Liquid Staking",
            terms: &[
                "liquid-staking", "staking", "jito", "marinade", "sanctum",
                "msol", "jitosol", "validator",
            ],
            context: "Liquid staking keeps absorbing stake as holders chase yield without losing liquidity.",
        },
        Theme {
            name: "NFTs",
            terms: &[
                "nfts", "collectibles", "tensor", "metaplex", "magic-eden",
                "royalties", "compressed-nfts", "mint",
            ],
            context: "NFT infrastructure is consolidating around cheaper mints and compressed state.",
        },
        Theme {
            name: "Gaming",
            terms: &["gaming", "play-to-earn", "metaverse", "esports", "arcade"],
            context: "On-chain gaming studios are shipping titles with embedded asset ownership.",
        },
        Theme {
            name: "Infrastructure",
            terms: &[
                "infrastructure", "firedancer", "rpc", "indexing", "node",
                "runtime", "performance", "scaling",
            ],
            context: "Core infrastructure upgrades are lifting throughput and client diversity.",
        },
        Theme {
            name: "Payments",
            terms: &["payments", "checkout", "remittance", "merchant", "commerce"],
            context: "Payment rails are quietly moving real commercial volume at sub-cent fees.",
        },
        Theme {
            name: "Mobile",
            terms: &["mobile", "saga", "solana-mobile", "phone", "android", "app-store"],
            context: "Mobile-first distribution is opening crypto apps to mainstream users.",
        },
        Theme {
            name: "DePIN",
            terms: &[
                "depin", "helium", "hivemapper", "render", "wireless",
                "mapping", "sensors",
            ],
            context: "DePIN networks are converting token incentives into physical coverage.",
        },
        Theme {
            name: "AI & Agents",
            terms: &["ai", "ai-agents", "inference", "model", "autonomous", "chatbot"],
            context: "AI agents with wallets are emerging as a new class of on-chain actor.",
        },
        Theme {
            name: "Developer Tools",
            terms: &[
                "developer-tools", "sdk", "anchor", "tooling", "framework",
                "devnet", "cli", "testing",
            ],
            context: "Tooling maturity keeps lowering the barrier for new teams to ship.",
        },
        Theme {
            name: "Token Extensions",
            terms: &[
                "token-extensions", "token-2022", "transfer-hooks",
                "confidential-transfers", "metadata-pointer",
            ],
            context: "Token extensions bring compliance and programmability to the token standard itself.",
        },
        Theme {
            name: "MEV",
            terms: &["mev", "searcher", "bundles", "arbitrage", "block-engine"],
            context: "MEV supply chains are formalizing around auctions and validator tips.",
        },
        Theme {
            name: "Cross-Chain",
            terms: &["cross-chain", "wormhole", "interoperability", "messaging"],
            context: "Cross-chain messaging is standardizing how liquidity moves between ecosystems.",
        },
        Theme {
            name: "RWA",
            terms: &["rwa", "real-world-assets", "tokenization", "treasury", "bonds", "credit"],
            context: "Tokenized real-world assets are pulling institutional balance sheets on-chain.",
        },
        Theme {
            name: "Oracles",
            terms: &["oracles", "pyth", "switchboard", "price-feeds", "data-feeds"],
            context: "Low-latency oracles are becoming the backbone of on-chain risk systems.",
        },
    ]
});

const DEFAULT_CONTEXT: &str =
    "A new cluster of activity is forming that does not fit established categories yet.";

fn keyword_matches(keyword: &str, term: &str) -> bool {
    keyword.contains(term) || term.contains(keyword)
}

/// Pick the theme whose term list matches the most of the given keywords
/// (substring match in either direction). Strict greater-than, so earlier
/// table entries win ties; no match at all falls back to `DEFAULT_THEME`.
pub fn identify_theme(keywords: &[String]) -> &'static str {
    let mut best = DEFAULT_THEME;
    let mut best_matches = 0usize;
    for theme in THEMES.iter() {
        let matches = keywords
            .iter()
            .filter(|kw| theme.terms.iter().any(|t| keyword_matches(kw, t)))
            .count();
        if matches > best_matches {
            best_matches = matches;
            best = theme.name;
        }
    }
    best
}

/// One sentence of canned context for a theme; generic fallback for
/// unrecognized names.
pub fn theme_context(theme: &str) -> &'static str {
    THEMES
        .iter()
        .find(|t| t.name == theme)
        .map(|t| t.context)
        .unwrap_or(DEFAULT_CONTEXT)
}

/// Lowercased words of the theme name itself; the title picker refuses
/// keywords overlapping these.
pub fn theme_name_words(theme: &str) -> Vec<String> {
    theme
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}
