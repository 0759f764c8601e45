//! Response-shape tests for the axum router with scripted sources.

mod support;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use marketpulse::config::Config;
use marketpulse::domain::Source;
use marketpulse::pipeline::Aggregator;
use marketpulse::server::{router, AppState};
use marketpulse::sources::MarketSource;
use support::{passing_record, ScriptedSource};
use tower::ServiceExt;

fn scripted_state(records: Vec<Box<dyn MarketSource>>) -> Arc<AppState> {
    let config = Config::default();
    let aggregator = Aggregator::new(config.clone())
        .expect("aggregator")
        .with_market_sources(records);
    Arc::new(AppState::with_aggregator(aggregator, &config))
}

async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let state = scripted_state(vec![
        Box::new(ScriptedSource::new(Source::Polymarket, vec![])),
        Box::new(ScriptedSource::new(Source::Kalshi, vec![])),
        Box::new(ScriptedSource::new(Source::Manifold, vec![])),
        Box::new(ScriptedSource::new(Source::Metaculus, vec![])),
    ]);

    let (status, body) = get_json(state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn predictions_serializes_camel_case_payload() {
    let state = scripted_state(vec![
        Box::new(ScriptedSource::new(
            Source::Polymarket,
            vec![passing_record("alpha", Source::Polymarket)],
        )),
        Box::new(ScriptedSource::new(Source::Kalshi, vec![])),
        Box::new(ScriptedSource::new(Source::Manifold, vec![])),
        Box::new(ScriptedSource::new(Source::Metaculus, vec![])),
    ]);

    let (status, body) = get_json(state, "/api/predictions").await;
    assert_eq!(status, StatusCode::OK);

    let markets = body["markets"].as_array().unwrap();
    assert_eq!(markets.len(), 1);
    assert_eq!(markets[0]["identity"], "alpha");
    assert_eq!(markets[0]["yes"], 55);
    assert_eq!(markets[0]["no"], 45);
    assert_eq!(markets[0]["source"], "polymarket");
    assert!(markets[0]["volume24h"].is_number());
    assert!(body["lastUpdated"].is_string());
    assert_eq!(body["hasPinned"], false);
    assert!(body["filter"].is_string());
}

#[tokio::test]
async fn empty_sources_still_return_success() {
    let state = scripted_state(vec![
        Box::new(ScriptedSource::new(Source::Polymarket, vec![])),
        Box::new(ScriptedSource::new(Source::Kalshi, vec![])),
        Box::new(ScriptedSource::new(Source::Manifold, vec![])),
        Box::new(ScriptedSource::new(Source::Metaculus, vec![])),
    ]);

    let (status, body) = get_json(state, "/api/predictions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["markets"].as_array().unwrap().len(), 0);
}
