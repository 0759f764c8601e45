//! HTTP boundary: one axum router over the four cached read endpoints.
//!
//! Handlers only consult the caches; the caches own the refresh policy.
//! Endpoint TTLs differ (spot quotes churn, market snapshots do not), so
//! each endpoint gets its own cache constructed once at startup and shared
//! through the router state.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::cache::TtlCache;
use crate::config::Config;
use crate::domain::{CryptoPayload, MemecoinsPayload, PredictionsPayload, TickerPayload};
use crate::error::Result;
use crate::pipeline::{compose_ticker, Aggregator};

pub struct AppState {
    aggregator: Aggregator,
    predictions: TtlCache<PredictionsPayload>,
    memecoins: TtlCache<MemecoinsPayload>,
    crypto: TtlCache<CryptoPayload>,
    ticker: TtlCache<TickerPayload>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let cache = &config.cache;
        let predictions = TtlCache::new(Duration::from_secs(cache.predictions_ttl_secs));
        let memecoins = TtlCache::new(Duration::from_secs(cache.memecoins_ttl_secs));
        let crypto = TtlCache::new(Duration::from_secs(cache.crypto_ttl_secs));
        let ticker = TtlCache::new(Duration::from_secs(cache.ticker_ttl_secs));

        Ok(Self {
            aggregator: Aggregator::new(config)?,
            predictions,
            memecoins,
            crypto,
            ticker,
        })
    }

    /// Assemble state around an existing aggregator; used by tests to
    /// plug in scripted sources.
    pub fn with_aggregator(aggregator: Aggregator, config: &Config) -> Self {
        let cache = &config.cache;
        Self {
            aggregator,
            predictions: TtlCache::new(Duration::from_secs(cache.predictions_ttl_secs)),
            memecoins: TtlCache::new(Duration::from_secs(cache.memecoins_ttl_secs)),
            crypto: TtlCache::new(Duration::from_secs(cache.crypto_ttl_secs)),
            ticker: TtlCache::new(Duration::from_secs(cache.ticker_ttl_secs)),
        }
    }

    /// Cached predictions snapshot, refreshing when stale.
    pub async fn predictions(&self) -> Result<PredictionsPayload> {
        self.predictions
            .get_or_refresh(|| async { Ok(self.aggregator.predictions().await) })
            .await
    }

    /// Cached memecoins snapshot, refreshing when stale.
    pub async fn memecoins(&self) -> Result<MemecoinsPayload> {
        self.memecoins
            .get_or_refresh(|| async { Ok(self.aggregator.memecoins().await) })
            .await
    }

    /// Cached spot quotes, refreshing when stale.
    pub async fn crypto(&self) -> Result<CryptoPayload> {
        self.crypto
            .get_or_refresh(|| self.aggregator.crypto())
            .await
    }

    /// Cached composite ticker, built from the crypto and predictions
    /// caches.
    pub async fn ticker(&self) -> Result<TickerPayload> {
        self.ticker
            .get_or_refresh(|| async {
                let crypto = self.crypto().await?;
                let predictions = self.predictions().await?;
                Ok(compose_ticker(&crypto, &predictions))
            })
            .await
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn respond<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(payload) => Json(payload).into_response(),
        Err(err) => {
            error!(error = %err, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn predictions_handler(State(state): State<Arc<AppState>>) -> Response {
    respond(state.predictions().await)
}

async fn memecoins_handler(State(state): State<Arc<AppState>>) -> Response {
    respond(state.memecoins().await)
}

async fn crypto_handler(State(state): State<Arc<AppState>>) -> Response {
    respond(state.crypto().await)
}

async fn ticker_handler(State(state): State<Arc<AppState>>) -> Response {
    respond(state.ticker().await)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/predictions", get(predictions_handler))
        .route("/api/memecoins", get(memecoins_handler))
        .route("/api/crypto", get(crypto_handler))
        .route("/api/ticker", get(ticker_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the task is cancelled.
pub async fn run(config: Config) -> Result<()> {
    let bind = config.server.bind.clone();
    let state = Arc::new(AppState::new(config)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(bind = %bind, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
