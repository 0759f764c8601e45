//! Manifold Markets adapter.
//!
//! Manifold is a flat list with a 0-1 probability on binary questions and a
//! play-money volume that only works as an activity proxy, hence its zero
//! volume threshold in the default config.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::MarketSourceConfig;
use crate::domain::{MarketRecord, OddsPair, Source};
use crate::error::Result;

use super::MarketSource;

pub struct ManifoldAdapter {
    client: Client,
    config: MarketSourceConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifoldMarket {
    id: Option<String>,
    slug: Option<String>,
    question: Option<String>,
    outcome_type: Option<String>,
    /// 0-1, binary questions only.
    probability: Option<f64>,
    #[serde(rename = "volume24Hours")]
    volume_24_hours: Option<f64>,
    volume: Option<f64>,
    /// Epoch milliseconds.
    close_time: Option<i64>,
}

impl ManifoldAdapter {
    #[must_use]
    pub fn new(client: Client, config: MarketSourceConfig) -> Self {
        Self { client, config }
    }

    async fn fetch_inner(&self) -> Result<Vec<MarketRecord>> {
        let url = format!("{}/markets?limit={}", self.config.base_url, self.config.limit);

        debug!(url = %url, "fetching manifold markets");

        let markets: Vec<ManifoldMarket> = self.client.get(&url).send().await?.json().await?;

        Ok(markets.into_iter().filter_map(normalize).collect())
    }
}

fn normalize(market: ManifoldMarket) -> Option<MarketRecord> {
    let identity = market
        .slug
        .filter(|s| !s.is_empty())
        .or(market.id)
        .filter(|s| !s.is_empty())?;
    let label = market.question.filter(|q| !q.is_empty())?;

    // Only binary questions carry a usable two-sided probability; other
    // outcome types pass through without odds and skip the band filter.
    let odds = if market.outcome_type.as_deref() == Some("BINARY") {
        let yes = market
            .probability
            .map(|p| (p * 100.0).round() as i64)
            .unwrap_or(50)
            .clamp(0, 100);
        Some(OddsPair::binary(yes))
    } else {
        None
    };

    let end_time = market
        .close_time
        .and_then(chrono::DateTime::from_timestamp_millis);

    Some(
        MarketRecord::new(
            identity,
            label,
            odds,
            market.volume_24_hours.unwrap_or(0.0),
            market.volume.unwrap_or(0.0),
            Source::Manifold,
        )
        .with_end_time(end_time),
    )
}

#[async_trait]
impl MarketSource for ManifoldAdapter {
    fn source(&self) -> Source {
        Source::Manifold
    }

    async fn fetch(&self) -> Vec<MarketRecord> {
        match self.fetch_inner().await {
            Ok(records) => {
                debug!(count = records.len(), "manifold fetch complete");
                records
            }
            Err(err) => {
                warn!(error = %err, "manifold fetch failed, continuing without it");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_market(probability: f64) -> ManifoldMarket {
        ManifoldMarket {
            id: Some("abc123".into()),
            slug: Some("will-it-happen".into()),
            question: Some("Will it happen?".into()),
            outcome_type: Some("BINARY".into()),
            probability: Some(probability),
            volume_24_hours: Some(420.0),
            volume: Some(9_000.0),
            close_time: None,
        }
    }

    #[test]
    fn probability_scales_to_percentage() {
        let record = normalize(binary_market(0.634)).unwrap();
        assert_eq!(record.odds, Some(OddsPair::new(63, 37)));
    }

    #[test]
    fn non_binary_market_has_no_odds() {
        let mut market = binary_market(0.5);
        market.outcome_type = Some("MULTIPLE_CHOICE".into());
        market.probability = None;
        let record = normalize(market).unwrap();
        assert!(record.odds.is_none());
    }

    #[test]
    fn id_backfills_missing_slug() {
        let mut market = binary_market(0.5);
        market.slug = None;
        let record = normalize(market).unwrap();
        assert_eq!(record.identity, "abc123");
    }
}
