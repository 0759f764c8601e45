//! Upstream feed adapters.
//!
//! One adapter per upstream. Each adapter owns its request timeout and its
//! source-specific normalization; any transport, status, or parse failure
//! is logged and yields an empty list so a bad upstream degrades result
//! completeness without failing the pass.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::NetworkConfig;
use crate::domain::{MarketRecord, Source};
use crate::error::Result;

pub mod coingecko;
pub mod gecko;
pub mod kalshi;
pub mod manifold;
pub mod metaculus;
pub mod polymarket;

pub use coingecko::{CoinGeckoAdapter, QuoteSet};
pub use gecko::{GeckoAdapter, TokenMetaClient};
pub use kalshi::KalshiAdapter;
pub use manifold::ManifoldAdapter;
pub use metaculus::MetaculusAdapter;
pub use polymarket::PolymarketAdapter;

/// A prediction-market platform feed.
///
/// `fetch` never raises: adapters recover from their own failures and the
/// pipeline proceeds with whatever the other sources returned.
#[async_trait]
pub trait MarketSource: Send + Sync {
    fn source(&self) -> Source;

    async fn fetch(&self) -> Vec<MarketRecord>;
}

/// Shared HTTP client with the configured user agent and per-request
/// timeout bound.
pub fn http_client(network: &NetworkConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(network.user_agent.clone())
        .timeout(Duration::from_secs(network.request_timeout_secs))
        .build()?;
    Ok(client)
}
