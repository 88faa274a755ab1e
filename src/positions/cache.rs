use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use super::clock::Clock;
use super::error::FetchError;
use super::fetcher::PositionFetcher;
use super::types::{Observer, PositionBatch, Positions};

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Default)]
struct CacheState {
    last_fetch_ms: Option<i64>,
    last_batch: Option<Arc<PositionBatch>>,
    last_raw: Option<Value>,
}

/// Time-gated cache in front of a [`PositionFetcher`].
///
/// Starts empty. A successful fetch replaces the current batch as a whole;
/// a failed one leaves it alone. Only one fetch runs at a time and callers
/// that queued behind it get its result from the cache.
pub struct PositionCache {
    fetcher: PositionFetcher,
    clock: Arc<dyn Clock>,
    min_interval_ms: i64,
    state: RwLock<CacheState>,
    refresh: Mutex<()>,
}

impl PositionCache {
    pub fn new(fetcher: PositionFetcher, clock: Arc<dyn Clock>, min_interval: Duration) -> Self {
        Self {
            fetcher,
            clock,
            min_interval_ms: i64::try_from(min_interval.as_millis()).unwrap_or(i64::MAX),
            state: RwLock::new(CacheState::default()),
            refresh: Mutex::new(()),
        }
    }

    pub async fn get_positions(
        &self,
        observer: &Observer,
        debug: bool,
    ) -> Result<Positions, FetchError> {
        if let Some(hit) = self.fresh(debug).await {
            return Ok(hit);
        }

        let _refresh = self.refresh.lock().await;
        if let Some(hit) = self.fresh(debug).await {
            log::debug!("Positions refreshed while waiting, serving from cache");
            return Ok(hit);
        }

        match self.fetcher.fetch(observer).await {
            Ok(outcome) => {
                let now = self.clock.now_ms();
                let batch = Arc::new(PositionBatch {
                    fetched_at_ms: now,
                    samples: outcome.samples,
                });
                let mut state = self.state.write().await;
                state.last_fetch_ms = Some(now);
                state.last_batch = Some(batch.clone());
                state.last_raw = Some(outcome.raw);
                log::info!(
                    "Returning {} satellites (cached=false)",
                    batch.samples.len()
                );
                Ok(Positions {
                    batch,
                    served_from_cache: false,
                    raw: if debug { state.last_raw.clone() } else { None },
                })
            }
            Err(err) => {
                self.state.write().await.last_raw = Some(err.raw().clone());
                Err(err)
            }
        }
    }

    /// Current batch, if any fetch has succeeded yet.
    pub async fn current(&self) -> Option<Arc<PositionBatch>> {
        self.state.read().await.last_batch.clone()
    }

    async fn fresh(&self, debug: bool) -> Option<Positions> {
        let state = self.state.read().await;
        let last_fetch_ms = state.last_fetch_ms?;
        let batch = state.last_batch.clone()?;
        if self.clock.now_ms() - last_fetch_ms >= self.min_interval_ms {
            return None;
        }
        Some(Positions {
            batch,
            served_from_cache: true,
            raw: if debug { state.last_raw.clone() } else { None },
        })
    }
}
