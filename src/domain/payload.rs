//! Serialized response bodies for the read endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::record::{MarketRecord, TokenRecord};

/// Body of `GET /api/predictions`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionsPayload {
    pub markets: Vec<MarketRecord>,
    pub last_updated: DateTime<Utc>,
    /// Human-readable description of the applied filters.
    pub filter: String,
    pub has_pinned: bool,
}

/// Market-cap band echoed back to the dashboard.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McapFilters {
    pub min_mcap: f64,
    pub max_mcap: f64,
}

/// Body of `GET /api/memecoins`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemecoinsPayload {
    pub memecoins: Vec<TokenRecord>,
    pub last_updated: DateTime<Utc>,
    pub source: String,
    pub filters: McapFilters,
}

/// Spot price and 24h change for one asset.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub price: f64,
    pub change_24h: f64,
}

/// Body of `GET /api/crypto`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoPayload {
    pub btc: Quote,
    pub eth: Quote,
    pub sol: Quote,
    pub last_updated: DateTime<Utc>,
}

/// One scrolling entry of the composite ticker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerItem {
    /// `"crypto"` or `"market"`.
    pub kind: &'static str,
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
}

/// Body of `GET /api/ticker`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerPayload {
    pub items: Vec<TickerItem>,
    pub last_updated: DateTime<Utc>,
}
