//! Marketpulse - prediction-market and trending-token aggregation service.
//!
//! Ingests live data from several loosely-structured upstreams (prediction
//! market platforms, a DEX trending-pool feed, spot price APIs),
//! normalizes everything into canonical record shapes, deduplicates
//! overlapping entities, scores and ranks them, and serves
//! freshness-bounded snapshots over HTTP.
//!
//! # Architecture
//!
//! One aggregation pass fans out to all source adapters concurrently,
//! joins every result, and runs the synchronous in-memory stages:
//!
//! ```text
//! endpoint -> cache -> (stale) fan-out adapters -> normalize -> dedup
//!          -> classify -> rank/select -> cache store -> serialize
//! ```
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with per-source thresholds and TTLs
//! - [`domain`] - canonical record and payload types
//! - [`error`] - error types for the crate
//! - [`sources`] - one adapter per upstream feed
//! - [`pipeline`] - dedup, classification, scoring, selection, fan-out
//! - [`cache`] - TTL cache with single-flight refresh
//! - [`server`] - axum router and handlers

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod server;
pub mod sources;
