//! Kalshi trade API adapter.
//!
//! Kalshi quotes prices in cents, which already map 1:1 onto the 0-100
//! scale, and reports 24h volume in contracts.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::MarketSourceConfig;
use crate::domain::{MarketRecord, OddsPair, Source};
use crate::error::Result;

use super::MarketSource;

pub struct KalshiAdapter {
    client: Client,
    config: MarketSourceConfig,
}

#[derive(Debug, Deserialize)]
struct MarketsResponse {
    #[serde(default)]
    markets: Vec<KalshiMarket>,
}

#[derive(Debug, Deserialize)]
struct KalshiMarket {
    ticker: Option<String>,
    title: Option<String>,
    /// Last traded yes price in cents.
    last_price: Option<i64>,
    volume_24h: Option<f64>,
    volume: Option<f64>,
    liquidity: Option<f64>,
    close_time: Option<chrono::DateTime<chrono::Utc>>,
}

impl KalshiAdapter {
    #[must_use]
    pub fn new(client: Client, config: MarketSourceConfig) -> Self {
        Self { client, config }
    }

    async fn fetch_inner(&self) -> Result<Vec<MarketRecord>> {
        let url = format!(
            "{}/markets?status=open&limit={}",
            self.config.base_url, self.config.limit
        );

        debug!(url = %url, "fetching kalshi markets");

        let response: MarketsResponse = self.client.get(&url).send().await?.json().await?;

        Ok(response.markets.into_iter().filter_map(normalize).collect())
    }
}

fn normalize(market: KalshiMarket) -> Option<MarketRecord> {
    let identity = market.ticker.filter(|t| !t.is_empty())?;
    let label = market.title.filter(|t| !t.is_empty())?;

    let odds = match market.last_price {
        Some(cents) => OddsPair::binary(cents.clamp(0, 100)),
        None => OddsPair::binary(50),
    };

    let total = match (market.volume, market.liquidity) {
        (Some(v), _) => v,
        (None, Some(l)) => l,
        (None, None) => 0.0,
    };

    Some(
        MarketRecord::new(
            identity,
            label,
            Some(odds),
            market.volume_24h.unwrap_or(0.0),
            total,
            Source::Kalshi,
        )
        .with_end_time(market.close_time),
    )
}

#[async_trait]
impl MarketSource for KalshiAdapter {
    fn source(&self) -> Source {
        Source::Kalshi
    }

    async fn fetch(&self) -> Vec<MarketRecord> {
        match self.fetch_inner().await {
            Ok(records) => {
                debug!(count = records.len(), "kalshi fetch complete");
                records
            }
            Err(err) => {
                warn!(error = %err, "kalshi fetch failed, continuing without it");
                Vec::new()
            }
        }
    }
}
