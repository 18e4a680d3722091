use crate::core::cache::KeyValueCollection;
use crate::core::spot::{
    Clock, SNAPSHOT_TTL, SpotPriceError, SpotPriceProvider, SpotPriceSnapshot, SpotPriceSource,
    SystemClock,
};
use async_trait::async_trait;
use chrono::{TimeDelta, Timelike};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const SNAPSHOT_KEY: &[u8] = b"spot_prices";

/// Serves spot prices from a single cached snapshot, going upstream only
/// when the snapshot is older than the TTL.
///
/// A failed fetch never touches the cached snapshot.
pub struct CachingSpotPriceProvider<T: SpotPriceSource> {
    inner: T,
    cache: Arc<dyn KeyValueCollection>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    // Held across the check-fetch-write sequence so concurrent stale reads
    // share one upstream call.
    fetch_lock: Mutex<()>,
}

impl<T: SpotPriceSource> CachingSpotPriceProvider<T> {
    pub fn new(inner: T, cache: Arc<dyn KeyValueCollection>) -> Self {
        Self {
            inner,
            cache,
            clock: Arc::new(SystemClock),
            ttl: SNAPSHOT_TTL,
            fetch_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    async fn cached(&self) -> Option<SpotPriceSnapshot> {
        let bytes = self.cache.get(SNAPSHOT_KEY).await?;
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Discarding unreadable cached spot prices: {}", e);
                self.cache.remove(SNAPSHOT_KEY).await;
                None
            }
        }
    }

    async fn fresh_cached(&self) -> Option<SpotPriceSnapshot> {
        let snapshot = self.cached().await?;
        if snapshot.is_fresh(self.clock.now(), self.ttl) {
            Some(snapshot)
        } else {
            None
        }
    }

    async fn fetch_and_store(&self) -> Result<SpotPriceSnapshot, SpotPriceError> {
        let quote = self.inner.fetch_quote().await.inspect_err(|e| {
            warn!(status = e.status_code(), "Spot price fetch failed, cache left untouched: {}", e);
        })?;

        // Whole seconds, so a snapshot read back from the cache equals the one returned here
        let now = self.clock.now();
        let fetched_at = now.with_nanosecond(0).unwrap_or(now);
        let snapshot = SpotPriceSnapshot::from_quote(quote, fetched_at);

        match serde_json::to_vec(&snapshot) {
            Ok(bytes) => {
                self.cache.put(SNAPSHOT_KEY, &bytes).await;
                info!("Spot prices fetched and cache updated");
            }
            Err(e) => warn!("Failed to serialize spot prices for caching: {}", e),
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl<T: SpotPriceSource> SpotPriceProvider for CachingSpotPriceProvider<T> {
    async fn get_spot_prices(&self) -> Result<SpotPriceSnapshot, SpotPriceError> {
        if let Some(snapshot) = self.fresh_cached().await {
            debug!("Serving spot prices from cache");
            return Ok(snapshot);
        }

        let _guard = self.fetch_lock.lock().await;
        // Another caller may have refreshed while we waited
        if let Some(snapshot) = self.fresh_cached().await {
            debug!("Serving spot prices refreshed by a concurrent caller");
            return Ok(snapshot);
        }

        info!("Cache stale or empty. Fetching fresh spot prices");
        self.fetch_and_store().await
    }

    async fn refresh_spot_prices(&self) -> Result<SpotPriceSnapshot, SpotPriceError> {
        let _guard = self.fetch_lock.lock().await;
        info!("Refreshing spot prices");
        self.fetch_and_store().await
    }

    async fn last_known(&self) -> Option<SpotPriceSnapshot> {
        self.cached().await
    }
}
