//! The aggregation pipeline: concurrent fan-out to every source, fan-in,
//! then the synchronous in-memory stages.
//!
//! Market adapters run concurrently but their outputs are flattened in
//! declared order before any ordering-sensitive stage, so the final list
//! is deterministic regardless of which upstream answered first. A slow or
//! failed source degrades completeness, never blocks past its own timeout,
//! and never cancels its siblings.

use chrono::Utc;
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::{
    CryptoPayload, McapFilters, MemecoinsPayload, PredictionsPayload, Source, TickerItem,
    TickerPayload, TokenRecord,
};
use crate::error::Result;
use crate::sources::{
    http_client, CoinGeckoAdapter, GeckoAdapter, KalshiAdapter, ManifoldAdapter, MarketSource,
    MetaculusAdapter, PolymarketAdapter, TokenMetaClient,
};

pub mod classify;
pub mod dedup;
pub mod score;
pub mod select;

use classify::classify_all;
use dedup::dedup_by_identity;
use score::shortlist_tokens;
use select::select_markets;

pub struct Aggregator {
    /// Declared order; flattening follows this order, not completion order.
    markets: Vec<Box<dyn MarketSource>>,
    trending: GeckoAdapter,
    meta: TokenMetaClient,
    quotes: CoinGeckoAdapter,
    config: Config,
}

impl Aggregator {
    /// Wire up the full adapter set from configuration.
    pub fn new(config: Config) -> Result<Self> {
        let client = http_client(&config.network)?;

        let markets: Vec<Box<dyn MarketSource>> = vec![
            Box::new(PolymarketAdapter::new(
                client.clone(),
                config.sources.polymarket.clone(),
            )),
            Box::new(KalshiAdapter::new(
                client.clone(),
                config.sources.kalshi.clone(),
            )),
            Box::new(ManifoldAdapter::new(
                client.clone(),
                config.sources.manifold.clone(),
            )),
            Box::new(MetaculusAdapter::new(
                client.clone(),
                config.sources.metaculus.clone(),
            )),
        ];

        Ok(Self {
            markets,
            trending: GeckoAdapter::new(client.clone(), config.sources.gecko.clone()),
            meta: TokenMetaClient::new(client.clone(), config.sources.gecko.clone()),
            quotes: CoinGeckoAdapter::new(client, config.sources.coingecko.clone()),
            config,
        })
    }

    /// Replace the market sources, keeping the token and quote adapters.
    /// Used by tests to substitute scripted sources.
    pub fn with_market_sources(mut self, markets: Vec<Box<dyn MarketSource>>) -> Self {
        self.markets = markets;
        self
    }

    /// One full predictions pass: fan-out, dedup, classify, select.
    pub async fn predictions(&self) -> PredictionsPayload {
        let results = join_all(self.markets.iter().map(|adapter| adapter.fetch())).await;

        // join_all preserves the declared adapter order.
        for (adapter, records) in self.markets.iter().zip(&results) {
            debug!(source = %adapter.source(), count = records.len(), "source contributed");
        }

        let mut records = dedup_by_identity(results.into_iter().flatten().collect());
        classify_all(&mut records);

        let (markets, has_pinned) = select_markets(
            records,
            &self.config.selection,
            &self.config.sources,
            self.config.pinned.as_ref(),
            Utc::now(),
        );

        info!(count = markets.len(), has_pinned, "predictions pass complete");

        PredictionsPayload {
            markets,
            last_updated: Utc::now(),
            filter: format!(
                "odds {}-{}, per-source volume minimums, sports excluded",
                select::ODDS_BAND_MIN,
                select::ODDS_BAND_MAX
            ),
            has_pinned,
        }
    }

    /// One full trending-tokens pass: fetch, dedup, enrich, filter, rank.
    pub async fn memecoins(&self) -> MemecoinsPayload {
        let trending = self.trending.fetch_trending().await;
        let deduped = dedup_by_identity(trending);

        // Bounded-concurrency metadata lookups; `buffered` keeps order.
        let enriched: Vec<TokenRecord> = stream::iter(deduped)
            .map(|token| self.meta.enrich(token))
            .buffered(self.config.sources.gecko.info_concurrency.max(1))
            .collect()
            .await;

        let filters = &self.config.tokens;
        let tokens = shortlist_tokens(enriched, filters);

        info!(count = tokens.len(), "memecoins pass complete");

        MemecoinsPayload {
            memecoins: tokens,
            last_updated: Utc::now(),
            source: Source::GeckoTerminal.to_string(),
            filters: McapFilters {
                min_mcap: filters.min_mcap,
                max_mcap: filters.max_mcap,
            },
        }
    }

    /// Spot quotes for the crypto endpoint.
    pub async fn crypto(&self) -> Result<CryptoPayload> {
        let quotes = self.quotes.fetch_quotes().await?;
        Ok(CryptoPayload {
            btc: quotes.btc,
            eth: quotes.eth,
            sol: quotes.sol,
            last_updated: Utc::now(),
        })
    }
}

/// How many market headlines the composite ticker carries.
const TICKER_MARKET_COUNT: usize = 3;

/// Compose the ticker from already-aggregated payloads; the server feeds
/// it from the crypto and predictions caches.
#[must_use]
pub fn compose_ticker(crypto: &CryptoPayload, predictions: &PredictionsPayload) -> TickerPayload {
    let mut items = vec![
        quote_item("BTC", crypto.btc.price, crypto.btc.change_24h),
        quote_item("ETH", crypto.eth.price, crypto.eth.change_24h),
        quote_item("SOL", crypto.sol.price, crypto.sol.change_24h),
    ];

    for market in predictions.markets.iter().take(TICKER_MARKET_COUNT) {
        items.push(TickerItem {
            kind: "market",
            label: market.label.clone(),
            value: market
                .odds
                .map(|o| format!("{}%", o.yes))
                .unwrap_or_else(|| "-".to_string()),
            change_24h: None,
        });
    }

    TickerPayload {
        items,
        last_updated: Utc::now(),
    }
}

fn quote_item(symbol: &str, price: f64, change: f64) -> TickerItem {
    TickerItem {
        kind: "crypto",
        label: symbol.to_string(),
        value: format!("${price:.2}"),
        change_24h: Some(change),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Quote;

    #[test]
    fn ticker_combines_quotes_and_headlines() {
        let crypto = CryptoPayload {
            btc: Quote {
                price: 97_000.0,
                change_24h: -1.2,
            },
            eth: Quote {
                price: 3_500.0,
                change_24h: 2.4,
            },
            sol: Quote {
                price: 210.0,
                change_24h: 0.0,
            },
            last_updated: Utc::now(),
        };
        let predictions = PredictionsPayload {
            markets: vec![],
            last_updated: Utc::now(),
            filter: String::new(),
            has_pinned: false,
        };

        let ticker = compose_ticker(&crypto, &predictions);
        assert_eq!(ticker.items.len(), 3);
        assert_eq!(ticker.items[0].label, "BTC");
        assert_eq!(ticker.items[0].value, "$97000.00");
    }
}
