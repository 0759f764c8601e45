//! Polymarket gamma API adapter.
//!
//! The gamma feed nests markets inside events and quotes two-sided prices
//! as a JSON-encoded string pair (`"[\"0.65\",\"0.35\"]"`), so this
//! adapter flattens events and converts prices to the 0-100 integer scale.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::MarketSourceConfig;
use crate::domain::{MarketRecord, OddsPair, Source};
use crate::error::Result;

use super::MarketSource;

pub struct PolymarketAdapter {
    client: Client,
    config: MarketSourceConfig,
}

#[derive(Debug, Deserialize)]
struct GammaEvent {
    #[serde(default)]
    markets: Vec<GammaMarket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GammaMarket {
    slug: Option<String>,
    question: Option<String>,
    /// JSON-encoded string array, e.g. `"[\"0.65\",\"0.35\"]"`.
    outcome_prices: Option<String>,
    #[serde(rename = "volume24hr")]
    volume_24hr: Option<f64>,
    volume: Option<NumberOrString>,
    end_date: Option<chrono::DateTime<chrono::Utc>>,
}

/// The gamma API is inconsistent about numeric fields; some arrive as
/// strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn as_f64(&self) -> f64 {
        match self {
            NumberOrString::Number(n) => *n,
            NumberOrString::String(s) => s.parse().unwrap_or(0.0),
        }
    }
}

impl PolymarketAdapter {
    #[must_use]
    pub fn new(client: Client, config: MarketSourceConfig) -> Self {
        Self { client, config }
    }

    async fn fetch_inner(&self) -> Result<Vec<MarketRecord>> {
        let url = format!(
            "{}/events?closed=false&active=true&order=volume24hr&ascending=false&limit={}",
            self.config.base_url, self.config.limit
        );

        debug!(url = %url, "fetching polymarket events");

        let events: Vec<GammaEvent> = self.client.get(&url).send().await?.json().await?;

        let records = events
            .into_iter()
            .flat_map(|event| event.markets)
            .filter_map(normalize)
            .collect();

        Ok(records)
    }
}

/// Map one gamma market into the canonical shape; returns `None` when the
/// mandatory slug or question is absent.
fn normalize(market: GammaMarket) -> Option<MarketRecord> {
    let identity = market.slug.filter(|s| !s.is_empty())?;
    let label = market.question.filter(|q| !q.is_empty())?;

    let odds = market
        .outcome_prices
        .as_deref()
        .and_then(parse_price_pair)
        .unwrap_or(OddsPair::binary(50));

    Some(
        MarketRecord::new(
            identity,
            label,
            Some(odds),
            market.volume_24hr.unwrap_or(0.0),
            market.volume.map(|v| v.as_f64()).unwrap_or(0.0),
            Source::Polymarket,
        )
        .with_end_time(market.end_date),
    )
}

/// Parse a `["0.65","0.35"]` pair into integer percentages, rounded to the
/// nearest point.
fn parse_price_pair(raw: &str) -> Option<OddsPair> {
    let prices: Vec<String> = serde_json::from_str(raw).ok()?;
    let yes = to_pct(prices.first()?)?;
    let no = to_pct(prices.get(1)?)?;
    Some(OddsPair::new(yes, no))
}

fn to_pct(price: &str) -> Option<i64> {
    let decimal: Decimal = price.trim().parse().ok()?;
    (decimal * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[async_trait]
impl MarketSource for PolymarketAdapter {
    fn source(&self) -> Source {
        Source::Polymarket
    }

    async fn fetch(&self) -> Vec<MarketRecord> {
        match self.fetch_inner().await {
            Ok(records) => {
                debug!(count = records.len(), "polymarket fetch complete");
                records
            }
            Err(err) => {
                warn!(error = %err, "polymarket fetch failed, continuing without it");
                Vec::new()
            }
        }
    }
}
