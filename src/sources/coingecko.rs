//! CoinGecko spot-quote adapter for the crypto and ticker endpoints.

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::CoinGeckoConfig;
use crate::domain::Quote;
use crate::error::Result;

pub struct CoinGeckoAdapter {
    client: Client,
    config: CoinGeckoConfig,
}

/// BTC/ETH/SOL spot quotes from one fetch.
#[derive(Debug, Clone, Copy)]
pub struct QuoteSet {
    pub btc: Quote,
    pub eth: Quote,
    pub sol: Quote,
}

#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
}

impl CoinGeckoAdapter {
    #[must_use]
    pub fn new(client: Client, config: CoinGeckoConfig) -> Self {
        Self { client, config }
    }

    /// Fetch spot quotes. Unlike the list-shaped feeds there is no useful
    /// empty value here, so failures propagate and the cache layer decides
    /// whether a stale entry can still be served.
    pub async fn fetch_quotes(&self) -> Result<QuoteSet> {
        let url = format!(
            "{}/simple/price?ids=bitcoin,ethereum,solana&vs_currencies=usd&include_24hr_change=true",
            self.config.base_url
        );

        debug!(url = %url, "fetching spot quotes");

        let prices: HashMap<String, SimplePrice> =
            self.client.get(&url).send().await?.json().await?;

        Ok(QuoteSet {
            btc: quote(&prices, "bitcoin"),
            eth: quote(&prices, "ethereum"),
            sol: quote(&prices, "solana"),
        })
    }
}

fn quote(prices: &HashMap<String, SimplePrice>, id: &str) -> Quote {
    let entry = prices.get(id);
    Quote {
        price: entry.and_then(|p| p.usd).unwrap_or(0.0),
        change_24h: entry.and_then(|p| p.usd_24h_change).unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_asset_defaults_to_zero_quote() {
        let mut prices = HashMap::new();
        prices.insert(
            "bitcoin".to_string(),
            SimplePrice {
                usd: Some(97_000.0),
                usd_24h_change: Some(-1.3),
            },
        );

        let btc = quote(&prices, "bitcoin");
        assert_eq!(btc.price, 97_000.0);
        assert_eq!(btc.change_24h, -1.3);

        let sol = quote(&prices, "solana");
        assert_eq!(sol.price, 0.0);
    }
}
