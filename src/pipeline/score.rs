//! Numeric scoring for trending tokens.
//!
//! The score is a sum of clamped factors: turnover (volume relative to
//! market cap), 24h and 1h momentum, a liquidity bucket, a market-cap
//! sweet-spot bonus, and a penalty for thin liquidity relative to market
//! cap. Rounded to one decimal.

use crate::config::TokenFilterConfig;
use crate::domain::TokenRecord;

const TURNOVER_WEIGHT: f64 = 100.0;
const TURNOVER_CAP: f64 = 30.0;
const CHANGE_24H_DIVISOR: f64 = 5.0;
const CHANGE_24H_CAP: f64 = 20.0;
const CHANGE_1H_DIVISOR: f64 = 2.0;
const CHANGE_1H_CAP: f64 = 15.0;

const LIQUIDITY_HIGH: f64 = 100_000.0;
const LIQUIDITY_MID: f64 = 50_000.0;

const SWEET_SPOT_MIN: f64 = 150_000.0;
const SWEET_SPOT_MAX: f64 = 2_000_000.0;
const SWEET_SPOT_BONUS: f64 = 15.0;

const THIN_LIQUIDITY_RATIO: f64 = 0.05;
const THIN_LIQUIDITY_PENALTY: f64 = 15.0;

/// Compute the score for one token, rounded to one decimal.
#[must_use]
pub fn score_token(token: &TokenRecord) -> f64 {
    let turnover = if token.market_cap > 0.0 {
        (token.volume_24h / token.market_cap * TURNOVER_WEIGHT).clamp(0.0, TURNOVER_CAP)
    } else {
        0.0
    };

    let momentum_24h = (token.price_change_24h / CHANGE_24H_DIVISOR).clamp(0.0, CHANGE_24H_CAP);
    let momentum_1h = (token.price_change_1h / CHANGE_1H_DIVISOR).clamp(0.0, CHANGE_1H_CAP);

    let liquidity_bucket = if token.liquidity > LIQUIDITY_HIGH {
        10.0
    } else if token.liquidity > LIQUIDITY_MID {
        5.0
    } else {
        0.0
    };

    let sweet_spot = if (SWEET_SPOT_MIN..=SWEET_SPOT_MAX).contains(&token.market_cap) {
        SWEET_SPOT_BONUS
    } else {
        0.0
    };

    let thin_liquidity = if token.market_cap > 0.0
        && token.liquidity / token.market_cap < THIN_LIQUIDITY_RATIO
    {
        THIN_LIQUIDITY_PENALTY
    } else {
        0.0
    };

    let raw = turnover + momentum_24h + momentum_1h + liquidity_bucket + sweet_spot
        - thin_liquidity;

    (raw * 10.0).round() / 10.0
}

/// Score every token and stable-sort descending; ties keep input order.
pub fn rank_tokens(tokens: &mut Vec<TokenRecord>) {
    for token in tokens.iter_mut() {
        token.score = Some(score_token(token));
    }
    tokens.sort_by(|a, b| {
        b.score
            .unwrap_or(0.0)
            .partial_cmp(&a.score.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Apply the market-cap band and minimum-age filters, rank, and truncate
/// to the configured cap.
///
/// The market-cap bounds are inclusive. A token with unknown age passed
/// the metadata lookup but not the pool-age probe; it is kept rather than
/// dropped on missing data.
#[must_use]
pub fn shortlist_tokens(tokens: Vec<TokenRecord>, filters: &TokenFilterConfig) -> Vec<TokenRecord> {
    let mut tokens: Vec<TokenRecord> = tokens
        .into_iter()
        .filter(|t| t.market_cap >= filters.min_mcap && t.market_cap <= filters.max_mcap)
        .filter(|t| match t.age_hours {
            Some(age) => age >= filters.min_age_hours,
            None => true,
        })
        .collect();

    rank_tokens(&mut tokens);
    tokens.truncate(filters.result_cap);
    tokens
}
