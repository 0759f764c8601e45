//! Canonical record shapes produced by source normalization.
//!
//! Every upstream payload is mapped into [`MarketRecord`] (prediction
//! markets) or [`TokenRecord`] (trending DEX tokens) at the adapter
//! boundary; untyped JSON never travels further than the adapter that
//! fetched it.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Origin adapter of a record.
///
/// Drives the per-source volume threshold and scoring nuances; 24h volumes
/// are in each source's own units and must never be compared across tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Polymarket,
    Kalshi,
    Manifold,
    Metaculus,
    GeckoTerminal,
    CoinGecko,
}

impl Source {
    /// Stable lowercase name used in logs and serialized payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Source::Polymarket => "polymarket",
            Source::Kalshi => "kalshi",
            Source::Manifold => "manifold",
            Source::Metaculus => "metaculus",
            Source::GeckoTerminal => "geckoterminal",
            Source::CoinGecko => "coingecko",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category flag attached by the classifier, never supplied by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Sports,
    MergersAcquisitions,
    Finance,
    Other,
}

/// Two-sided odds on the 0-100 integer scale.
///
/// `yes + no == 100` holds for binary-market sources only; activity-proxy
/// sources may carry non-complementary pairs and consumers must not assume
/// the sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OddsPair {
    pub yes: i64,
    pub no: i64,
}

impl OddsPair {
    #[must_use]
    pub const fn new(yes: i64, no: i64) -> Self {
        Self { yes, no }
    }

    /// Build a complementary pair from the yes side.
    #[must_use]
    pub const fn binary(yes: i64) -> Self {
        Self { yes, no: 100 - yes }
    }
}

/// One side of a pinned matchup.
#[derive(Debug, Clone, Serialize)]
pub struct MatchupSide {
    pub name: String,
    pub odds: i64,
}

/// Favorite/underdog odds for the externally pinned matchup.
#[derive(Debug, Clone, Serialize)]
pub struct PinnedMatchup {
    pub favorite: MatchupSide,
    pub underdog: MatchupSide,
}

/// A prediction-market question after normalization.
///
/// Rebuilt from scratch on every aggregation pass; only cache entries
/// outlive a pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRecord {
    /// Stable identity across polls (slug or ticker); the dedup key.
    pub identity: String,
    /// Human-readable question text.
    pub label: String,
    /// Absent for records without a binary odds interpretation.
    #[serde(flatten)]
    pub odds: Option<OddsPair>,
    /// 24h volume in the source's own units.
    pub volume_24h: f64,
    /// Lifetime volume or liquidity, secondary magnitude signal.
    pub total_volume: f64,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Computed by the classifier after dedup.
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matchup: Option<PinnedMatchup>,
}

impl MarketRecord {
    /// Create an unclassified record; the classifier fills `categories`.
    #[must_use]
    pub fn new(
        identity: impl Into<String>,
        label: impl Into<String>,
        odds: Option<OddsPair>,
        volume_24h: f64,
        total_volume: f64,
        source: Source,
    ) -> Self {
        Self {
            identity: identity.into(),
            label: label.into(),
            odds,
            volume_24h: volume_24h.max(0.0),
            total_volume: total_volume.max(0.0),
            source,
            end_time: None,
            categories: Vec::new(),
            pinned: false,
            matchup: None,
        }
    }

    #[must_use]
    pub fn with_end_time(mut self, end_time: Option<DateTime<Utc>>) -> Self {
        self.end_time = end_time;
        self
    }

    #[must_use]
    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

/// A trending DEX token after normalization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Token mint address; the dedup key.
    pub identity: String,
    /// Ticker symbol.
    pub label: String,
    pub name: String,
    pub price_usd: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub price_change_24h: f64,
    pub price_change_1h: f64,
    pub liquidity: f64,
    /// Hours since pool creation; `None` when the metadata lookup failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_hours: Option<f64>,
    pub source: Source,
    /// Assigned during ranking only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}
