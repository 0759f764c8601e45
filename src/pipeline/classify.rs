//! Keyword-heuristic category classifier.
//!
//! Stateless and evaluated per record after dedup. Ordering is load-
//! bearing in one place: an M&A match suppresses the generic finance
//! check, so "Will Microsoft acquire Activision" is tagged M&A only even
//! though it also matches finance keywords.

use crate::domain::{Category, MarketRecord};

const SPORTS_KEYWORDS: &[&str] = &[
    " vs ", " vs.", "nfl", "nba", "nhl", "mlb", "premier league", "champions league",
    "super bowl", "world cup", "playoff", "grand slam", "ufc", "heavyweight",
    "win the match", "win the game", "championship",
];

const MNA_KEYWORDS: &[&str] = &[
    "acquire", "acquisition", "merger", "merge with", "buyout", "takeover",
    "take over", "m&a",
];

const FINANCE_KEYWORDS: &[&str] = &[
    "stock", "share price", "market cap", "ipo", "earnings", "revenue", "fed",
    "interest rate", "rate cut", "rate hike", "inflation", "gdp", "recession",
    "s&p", "nasdaq", "dow", "bitcoin", "ethereum", "etf", "bankrupt", "valuation",
];

/// Tag a record with zero or more category flags; records matching nothing
/// fall into the `Other` bucket.
pub fn classify(label: &str) -> Vec<Category> {
    let lowered = label.to_lowercase();
    let mut categories = Vec::new();

    if matches_any(&lowered, SPORTS_KEYWORDS) {
        categories.push(Category::Sports);
    }

    // M&A precedes and suppresses the finance check.
    if matches_any(&lowered, MNA_KEYWORDS) {
        categories.push(Category::MergersAcquisitions);
    } else if matches_any(&lowered, FINANCE_KEYWORDS) {
        categories.push(Category::Finance);
    }

    if categories.is_empty() {
        categories.push(Category::Other);
    }

    categories
}

/// Classify every record in place.
pub fn classify_all(records: &mut [MarketRecord]) {
    for record in records {
        record.categories = classify(&record.label);
    }
}

fn matches_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}
