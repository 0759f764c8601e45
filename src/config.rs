//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file with environment variable
//! overrides for sensitive values like `METACULUS_API_KEY`. Per-source
//! thresholds live here so that adding a source is a data change, not a
//! code change.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub tokens: TokenFilterConfig,
    /// Optional pinned matchup injected at the head of the predictions list.
    #[serde(default)]
    pub pinned: Option<PinnedConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Sent on every outbound request; several upstreams reject the
    /// default reqwest agent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-adapter request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_user_agent() -> String {
    format!("marketpulse/{}", env!("CARGO_PKG_VERSION"))
}

const fn default_request_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Per-upstream settings for the four market platforms and the token feeds.
///
/// 24h volumes are in each source's own units and are never compared across
/// sources; the minimum-volume threshold is therefore looked up per source.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "MarketSourceConfig::polymarket")]
    pub polymarket: MarketSourceConfig,
    #[serde(default = "MarketSourceConfig::kalshi")]
    pub kalshi: MarketSourceConfig,
    #[serde(default = "MarketSourceConfig::manifold")]
    pub manifold: MarketSourceConfig,
    #[serde(default = "MarketSourceConfig::metaculus")]
    pub metaculus: MarketSourceConfig,
    #[serde(default)]
    pub gecko: GeckoConfig,
    #[serde(default)]
    pub coingecko: CoinGeckoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketSourceConfig {
    pub base_url: String,
    /// Records below this 24h volume (source units) are dropped.
    pub min_volume_24h: f64,
    /// Page size requested from the upstream.
    #[serde(default = "default_fetch_limit")]
    pub limit: u32,
    /// Bearer/API key, resolved from the environment at load time.
    #[serde(skip)]
    pub api_key: Option<String>,
}

const fn default_fetch_limit() -> u32 {
    100
}

impl MarketSourceConfig {
    fn polymarket() -> Self {
        Self {
            base_url: "https://gamma-api.polymarket.com".into(),
            min_volume_24h: 10_000.0,
            limit: default_fetch_limit(),
            api_key: None,
        }
    }

    fn kalshi() -> Self {
        Self {
            base_url: "https://api.elections.kalshi.com/trade-api/v2".into(),
            min_volume_24h: 5_000.0,
            limit: default_fetch_limit(),
            api_key: None,
        }
    }

    fn manifold() -> Self {
        Self {
            base_url: "https://api.manifold.markets/v0".into(),
            // Play-money activity proxy, no meaningful dollar volume.
            min_volume_24h: 0.0,
            limit: default_fetch_limit(),
            api_key: None,
        }
    }

    fn metaculus() -> Self {
        Self {
            base_url: "https://www.metaculus.com/api2".into(),
            min_volume_24h: 0.0,
            limit: 50,
            api_key: None,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            polymarket: MarketSourceConfig::polymarket(),
            kalshi: MarketSourceConfig::kalshi(),
            manifold: MarketSourceConfig::manifold(),
            metaculus: MarketSourceConfig::metaculus(),
            gecko: GeckoConfig::default(),
            coingecko: CoinGeckoConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeckoConfig {
    #[serde(default = "default_gecko_url")]
    pub base_url: String,
    #[serde(default = "default_gecko_network")]
    pub network: String,
    /// Cap on concurrent token-info lookups per pass.
    #[serde(default = "default_info_concurrency")]
    pub info_concurrency: usize,
}

fn default_gecko_url() -> String {
    "https://api.geckoterminal.com/api/v2".to_string()
}

fn default_gecko_network() -> String {
    "solana".to_string()
}

const fn default_info_concurrency() -> usize {
    4
}

impl Default for GeckoConfig {
    fn default() -> Self {
        Self {
            base_url: default_gecko_url(),
            network: default_gecko_network(),
            info_concurrency: default_info_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoinGeckoConfig {
    #[serde(default = "default_coingecko_url")]
    pub base_url: String,
}

fn default_coingecko_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: default_coingecko_url(),
        }
    }
}

/// Freshness windows, one per cached endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_snapshot_ttl")]
    pub predictions_ttl_secs: u64,
    #[serde(default = "default_snapshot_ttl")]
    pub memecoins_ttl_secs: u64,
    #[serde(default = "default_crypto_ttl")]
    pub crypto_ttl_secs: u64,
    #[serde(default = "default_ticker_ttl")]
    pub ticker_ttl_secs: u64,
}

const fn default_snapshot_ttl() -> u64 {
    300
}

const fn default_crypto_ttl() -> u64 {
    30
}

const fn default_ticker_ttl() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            predictions_ttl_secs: default_snapshot_ttl(),
            memecoins_ttl_secs: default_snapshot_ttl(),
            crypto_ttl_secs: default_crypto_ttl(),
            ticker_ttl_secs: default_ticker_ttl(),
        }
    }
}

/// Slot allocation for the category-balanced predictions list.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_total_cap")]
    pub total_cap: usize,
    #[serde(default = "default_mna_cap")]
    pub mna_cap: usize,
    #[serde(default = "default_finance_first_pass")]
    pub finance_first_pass: usize,
    #[serde(default = "default_finance_cap")]
    pub finance_cap: usize,
}

const fn default_total_cap() -> usize {
    30
}

const fn default_mna_cap() -> usize {
    5
}

const fn default_finance_first_pass() -> usize {
    6
}

const fn default_finance_cap() -> usize {
    12
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            total_cap: default_total_cap(),
            mna_cap: default_mna_cap(),
            finance_first_pass: default_finance_first_pass(),
            finance_cap: default_finance_cap(),
        }
    }
}

/// Market-cap band and ranking cap for the trending-token list.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenFilterConfig {
    #[serde(default = "default_min_mcap")]
    pub min_mcap: f64,
    #[serde(default = "default_max_mcap")]
    pub max_mcap: f64,
    /// Tokens younger than this are dropped when age is known.
    #[serde(default = "default_min_age_hours")]
    pub min_age_hours: f64,
    #[serde(default = "default_token_cap")]
    pub result_cap: usize,
}

const fn default_min_mcap() -> f64 {
    50_000.0
}

const fn default_max_mcap() -> f64 {
    10_000_000.0
}

const fn default_min_age_hours() -> f64 {
    24.0
}

const fn default_token_cap() -> usize {
    20
}

impl Default for TokenFilterConfig {
    fn default() -> Self {
        Self {
            min_mcap: default_min_mcap(),
            max_mcap: default_max_mcap(),
            min_age_hours: default_min_age_hours(),
            result_cap: default_token_cap(),
        }
    }
}

/// A long-running matchup pinned to the head of the predictions list while
/// both sides are still being quoted and the cutoff date has not passed.
#[derive(Debug, Clone, Deserialize)]
pub struct PinnedConfig {
    pub label: String,
    /// Case-insensitive substring identifying the favorite's market.
    pub favorite: String,
    /// Case-insensitive substring identifying the underdog's market.
    pub underdog: String,
    pub cutoff: DateTime<Utc>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;

        // API keys come from the environment, never from the config file.
        config.sources.metaculus.api_key = std::env::var("METACULUS_API_KEY").ok();

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.bind.is_empty() {
            return Err(ConfigError::MissingField { field: "bind" }.into());
        }
        if self.network.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be at least 1 second".into(),
            }
            .into());
        }
        if self.tokens.min_mcap >= self.tokens.max_mcap {
            return Err(ConfigError::InvalidValue {
                field: "min_mcap",
                reason: format!(
                    "must be below max_mcap ({} >= {})",
                    self.tokens.min_mcap, self.tokens.max_mcap
                ),
            }
            .into());
        }
        if self.selection.finance_first_pass > self.selection.finance_cap {
            return Err(ConfigError::InvalidValue {
                field: "finance_first_pass",
                reason: "cannot exceed finance_cap".into(),
            }
            .into());
        }
        Ok(())
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind: default_bind(),
            },
            network: NetworkConfig::default(),
            logging: LoggingConfig::default(),
            sources: SourcesConfig::default(),
            cache: CacheConfig::default(),
            selection: SelectionConfig::default(),
            tokens: TokenFilterConfig::default(),
            pinned: None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
