//! Shared test fixtures: scripted market sources with invocation
//! counters and simulated latency.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use marketpulse::domain::{MarketRecord, OddsPair, Source};
use marketpulse::sources::MarketSource;

/// A market source that returns a fixed record list after an optional
/// delay, counting how many times it was fetched.
pub struct ScriptedSource {
    source: Source,
    records: Vec<MarketRecord>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(source: Source, records: Vec<MarketRecord>) -> Self {
        Self {
            source,
            records,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Simulate upstream latency so completion order differs from the
    /// declared order.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl MarketSource for ScriptedSource {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch(&self) -> Vec<MarketRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.records.clone()
    }
}

/// A market record that clears the default Polymarket thresholds.
pub fn passing_record(identity: &str, source: Source) -> MarketRecord {
    MarketRecord::new(
        identity,
        format!("Will {identity} resolve yes?"),
        Some(OddsPair::binary(55)),
        50_000.0,
        250_000.0,
        source,
    )
}
