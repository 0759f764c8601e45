//! GeckoTerminal adapters: the trending-pools feed and the token metadata
//! lookup that enriches it.
//!
//! GeckoTerminal serializes every number as a string, so normalization here
//! is mostly careful string parsing with zero defaults.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::GeckoConfig;
use crate::domain::{Source, TokenRecord};
use crate::error::Result;

/// Trending-pools feed.
pub struct GeckoAdapter {
    client: Client,
    config: GeckoConfig,
}

#[derive(Debug, Deserialize)]
struct PoolsResponse {
    #[serde(default)]
    data: Vec<Pool>,
}

#[derive(Debug, Deserialize)]
struct Pool {
    attributes: PoolAttributes,
    relationships: Option<PoolRelationships>,
}

#[derive(Debug, Deserialize)]
struct PoolAttributes {
    /// `"WIF / SOL"` style pair name.
    name: Option<String>,
    base_token_price_usd: Option<String>,
    market_cap_usd: Option<String>,
    fdv_usd: Option<String>,
    reserve_in_usd: Option<String>,
    volume_usd: Option<VolumeUsd>,
    price_change_percentage: Option<PriceChange>,
    pool_created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct VolumeUsd {
    h24: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PriceChange {
    h1: Option<String>,
    h24: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PoolRelationships {
    base_token: Option<Relationship>,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    data: Option<RelationshipData>,
}

#[derive(Debug, Deserialize)]
struct RelationshipData {
    /// `"<network>_<address>"`.
    id: Option<String>,
}

impl GeckoAdapter {
    #[must_use]
    pub fn new(client: Client, config: GeckoConfig) -> Self {
        Self { client, config }
    }

    /// Fetch the trending pools for the configured network. Never raises;
    /// failures log and yield an empty list.
    pub async fn fetch_trending(&self) -> Vec<TokenRecord> {
        match self.fetch_inner().await {
            Ok(records) => {
                debug!(count = records.len(), "trending pools fetch complete");
                records
            }
            Err(err) => {
                warn!(error = %err, "trending pools fetch failed, continuing without it");
                Vec::new()
            }
        }
    }

    async fn fetch_inner(&self) -> Result<Vec<TokenRecord>> {
        let url = format!(
            "{}/networks/{}/trending_pools",
            self.config.base_url, self.config.network
        );

        debug!(url = %url, "fetching trending pools");

        let response: PoolsResponse = self.client.get(&url).send().await?.json().await?;

        let network = self.config.network.as_str();
        Ok(response
            .data
            .into_iter()
            .filter_map(|pool| normalize(pool, network))
            .collect())
    }
}

fn normalize(pool: Pool, network: &str) -> Option<TokenRecord> {
    let address = pool
        .relationships
        .and_then(|r| r.base_token)
        .and_then(|t| t.data)
        .and_then(|d| d.id)
        .map(|id| {
            id.strip_prefix(&format!("{network}_"))
                .map(String::from)
                .unwrap_or(id)
        })
        .filter(|a| !a.is_empty())?;

    let pair_name = pool.attributes.name.filter(|n| !n.is_empty())?;
    // "WIF / SOL" -> "WIF"
    let symbol = pair_name
        .split('/')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(pair_name.as_str())
        .to_string();

    let market_cap = parse_f64(pool.attributes.market_cap_usd.as_deref());
    // Market cap is frequently null on fresh pools; fall back to FDV.
    let market_cap = if market_cap > 0.0 {
        market_cap
    } else {
        parse_f64(pool.attributes.fdv_usd.as_deref())
    };

    let (change_1h, change_24h) = pool
        .attributes
        .price_change_percentage
        .map(|p| (parse_f64(p.h1.as_deref()), parse_f64(p.h24.as_deref())))
        .unwrap_or((0.0, 0.0));

    let age_hours = pool.attributes.pool_created_at.map(|created| {
        (Utc::now() - created).num_seconds().max(0) as f64 / 3600.0
    });

    Some(TokenRecord {
        identity: address,
        label: symbol.clone(),
        name: symbol,
        price_usd: parse_f64(pool.attributes.base_token_price_usd.as_deref()),
        market_cap,
        volume_24h: parse_f64(pool.attributes.volume_usd.and_then(|v| v.h24).as_deref()),
        price_change_24h: change_24h,
        price_change_1h: change_1h,
        liquidity: parse_f64(pool.attributes.reserve_in_usd.as_deref()),
        age_hours,
        source: Source::GeckoTerminal,
        score: None,
    })
}

fn parse_f64(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0.0)
}

/// Token metadata lookup backing the enrichment stage.
///
/// Fills in the proper name/symbol and a market cap for records the
/// trending feed left at zero. A failed lookup leaves the record as-is.
pub struct TokenMetaClient {
    client: Client,
    config: GeckoConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    data: Option<TokenData>,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    attributes: TokenAttributes,
}

#[derive(Debug, Deserialize)]
struct TokenAttributes {
    name: Option<String>,
    symbol: Option<String>,
    market_cap_usd: Option<String>,
}

impl TokenMetaClient {
    #[must_use]
    pub fn new(client: Client, config: GeckoConfig) -> Self {
        Self { client, config }
    }

    /// Enrich a trending record with token metadata.
    pub async fn enrich(&self, mut record: TokenRecord) -> TokenRecord {
        let url = format!(
            "{}/networks/{}/tokens/{}",
            self.config.base_url, self.config.network, record.identity
        );

        let response: TokenResponse = match self.fetch_token(&url).await {
            Ok(r) => r,
            Err(err) => {
                warn!(token = %record.identity, error = %err, "token metadata lookup failed");
                return record;
            }
        };

        if let Some(data) = response.data {
            if let Some(name) = data.attributes.name.filter(|n| !n.is_empty()) {
                record.name = name;
            }
            if let Some(symbol) = data.attributes.symbol.filter(|s| !s.is_empty()) {
                record.label = symbol;
            }
            if record.market_cap <= 0.0 {
                record.market_cap = parse_f64(data.attributes.market_cap_usd.as_deref());
            }
        }

        record
    }

    async fn fetch_token(&self, url: &str) -> Result<TokenResponse> {
        let response = self.client.get(url).send().await?.json().await?;
        Ok(response)
    }
}
