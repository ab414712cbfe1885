//! Fixed financial-sentiment lexicon.
//!
//! The term list and weights are load-bearing: existing consumers of the
//! score depend on these exact values, so entries must not be edited without
//! a score-version bump. Multi-word entries never match a single token after
//! whitespace splitting; they are kept so the table stays numerically
//! identical to prior score consumers.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Strong positive terms, weight +2.
const STRONG_POSITIVE: &[&str] = &[
    "bullish",
    "surge",
    "soar",
    "rally",
    "boom",
    "breakthrough",
    "record",
];

/// Moderate positive terms, weight +1.
const POSITIVE: &[&str] = &[
    "all-time high",
    "beat estimates",
    "exceed expectations",
    "strong earnings",
    "profit surge",
    "gain",
    "rise",
    "up",
    "positive",
    "growth",
    "increase",
    "buy",
    "upgrade",
    "outperform",
    "strong",
    "solid",
    "good",
    "better",
    "improved",
    "optimistic",
    "confident",
    "recover",
    "rebound",
    "momentum",
    "expansion",
];

/// Strong negative terms, weight -2.
const STRONG_NEGATIVE: &[&str] = &[
    "bearish",
    "crash",
    "plummet",
    "collapse",
    "bankruptcy",
    "scandal",
];

/// Moderate negative terms, weight -1.
const NEGATIVE: &[&str] = &[
    "fraud",
    "miss estimates",
    "disappointing",
    "worst",
    "crisis",
    "recession",
    "loss",
    "fall",
    "down",
    "negative",
    "decline",
    "decrease",
    "sell",
    "downgrade",
    "underperform",
    "weak",
    "poor",
    "bad",
    "worse",
    "concern",
    "worry",
    "risk",
    "volatile",
    "uncertainty",
    "challenge",
    "struggle",
];

fn table() -> &'static HashMap<&'static str, i32> {
    static TABLE: OnceLock<HashMap<&'static str, i32>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map = HashMap::new();
        for &word in STRONG_POSITIVE {
            map.insert(word, 2);
        }
        for &word in POSITIVE {
            map.insert(word, 1);
        }
        for &word in STRONG_NEGATIVE {
            map.insert(word, -2);
        }
        for &word in NEGATIVE {
            map.insert(word, -1);
        }
        map
    })
}

/// Signed weight for a single lowercased token, if it is in the lexicon.
pub(crate) fn weight(token: &str) -> Option<i32> {
    table().get(token).copied()
}

/// Number of terms in the lexicon, exposed for diagnostics.
pub fn vocabulary_size() -> usize {
    table().len()
}
