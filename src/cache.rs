//! TTL cache with single-flight refresh.
//!
//! One cache wraps one aggregation pass. A read within the freshness
//! window returns the stored snapshot without touching the network; a
//! stale or empty read runs exactly one refresh while concurrent callers
//! queue on the gate and then observe the freshly stored payload. This
//! keeps N simultaneous dashboard requests from fanning out N times
//! against rate-limited upstreams.

use std::future::Future;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::error::Result;

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    payload: T,
    captured_at: Instant,
}

pub struct TtlCache<T> {
    ttl: Duration,
    entry: RwLock<Option<CacheEntry<T>>>,
    /// Refresh gate: held for the whole refresh, so followers wait on the
    /// in-flight pass instead of starting their own.
    refresh: Mutex<()>,
}

impl<T: Clone> TtlCache<T> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Return the cached payload if within the TTL, refreshing otherwise.
    ///
    /// The refresh closure runs at most once per staleness window no
    /// matter how many callers arrive concurrently. A failed refresh
    /// leaves the previous entry untouched and falls back to it when one
    /// exists; with no previous entry the error surfaces to the caller.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(payload) = self.fresh() {
            return Ok(payload);
        }

        let _gate = self.refresh.lock().await;

        // A refresh may have completed while this caller waited.
        if let Some(payload) = self.fresh() {
            return Ok(payload);
        }

        match refresh().await {
            Ok(payload) => {
                *self.entry.write() = Some(CacheEntry {
                    payload: payload.clone(),
                    captured_at: Instant::now(),
                });
                Ok(payload)
            }
            Err(err) => match self.any() {
                // Stale-but-available beats an error page.
                Some(payload) => Ok(payload),
                None => Err(err),
            },
        }
    }

    fn fresh(&self) -> Option<T> {
        let guard = self.entry.read();
        guard
            .as_ref()
            .filter(|entry| entry.captured_at.elapsed() < self.ttl)
            .map(|entry| entry.payload.clone())
    }

    fn any(&self) -> Option<T> {
        self.entry.read().as_ref().map(|entry| entry.payload.clone())
    }
}
