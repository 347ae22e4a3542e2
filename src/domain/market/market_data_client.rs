//! Caching client for pool and price data

use super::{estimate_realized_loss, CacheStore, MarketDataSource};
use crate::domain::registry::PoolRegistry;
use crate::shared::config::CacheConfig;
use crate::shared::errors::MarketError;
use crate::shared::types::{OptimalRange, PoolSnapshot, PriceSnapshot, RiskTolerance};
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Expected yield estimates are capped at this percentage
const MAX_EXPECTED_YIELD_PCT: f64 = 50.0;
/// Band half-width at which the yield estimate equals the pool APY
const YIELD_REFERENCE_WIDTH: f64 = 0.20;

/// Fetches pool metrics and price snapshots through a freshness-bounded
/// cache. Concurrent fetches for the same key coalesce so that at most one
/// upstream call per key is in flight.
pub struct MarketDataClient {
    registry: Arc<PoolRegistry>,
    source: Arc<dyn MarketDataSource>,
    cache: Arc<dyn CacheStore>,
    config: CacheConfig,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MarketDataClient {
    pub fn new(
        registry: Arc<PoolRegistry>,
        source: Arc<dyn MarketDataSource>,
        cache: Arc<dyn CacheStore>,
        config: CacheConfig,
    ) -> Self {
        Self {
            registry,
            source,
            cache,
            config,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<PoolRegistry> {
        &self.registry
    }

    /// Return the cached pool snapshot when fresh, otherwise fetch from the
    /// upstream source and cache the replacement.
    pub async fn get_pool_snapshot(&self, pair_id: &str) -> Result<PoolSnapshot, MarketError> {
        let pair = self
            .registry
            .get(pair_id)
            .ok_or_else(|| MarketError::DataUnavailable(pair_id.to_string()))?;
        let key = format!("pool:{}", pair_id);

        if let Some(snapshot) = self.read_cached::<PoolSnapshot>(&key).await {
            return Ok(snapshot);
        }

        let lock = self.key_lock(&key).await;
        let _guard = lock.lock().await;
        // A coalesced waiter finds the entry the winning fetch just wrote.
        if let Some(snapshot) = self.read_cached::<PoolSnapshot>(&key).await {
            return Ok(snapshot);
        }

        let metrics = self
            .source
            .fetch_pool_metrics(&pair.address)
            .await?
            .ok_or_else(|| MarketError::DataUnavailable(pair_id.to_string()))?;

        let snapshot = PoolSnapshot {
            pair_id: pair_id.to_string(),
            current_price: metrics.price,
            price_change_24h: metrics.price_change_24h,
            liquidity: metrics.liquidity,
            volume_24h: metrics.volume_24h,
            apy: metrics.apy,
            tvl: metrics.tvl,
            fee_rate: metrics.fee_rate,
            fetched_at: Utc::now(),
        };
        self.write_cached(&key, &snapshot, Duration::from_secs(self.config.pool_ttl_secs))
            .await;
        debug!(pair_id, "pool snapshot refreshed");
        Ok(snapshot)
    }

    /// Price snapshots run on their own 5s cache lifecycle. A miss first
    /// ensures a pool snapshot, since the live price derives from the pool
    /// base price.
    pub async fn get_price_snapshot(&self, pair_id: &str) -> Result<PriceSnapshot, MarketError> {
        let pair = self
            .registry
            .get(pair_id)
            .ok_or_else(|| MarketError::DataUnavailable(pair_id.to_string()))?;
        let key = format!("price:{}", pair_id);

        if let Some(snapshot) = self.read_cached::<PriceSnapshot>(&key).await {
            return Ok(snapshot);
        }

        let lock = self.key_lock(&key).await;
        let _guard = lock.lock().await;
        if let Some(snapshot) = self.read_cached::<PriceSnapshot>(&key).await {
            return Ok(snapshot);
        }

        let pool = self.get_pool_snapshot(pair_id).await?;
        let metrics = self
            .source
            .fetch_price_metrics(&pair.address, pool.current_price)
            .await?
            .ok_or_else(|| MarketError::DataUnavailable(pair_id.to_string()))?;

        let snapshot = PriceSnapshot {
            pair_id: pair_id.to_string(),
            current_price: metrics.price,
            change_24h: metrics.change_24h,
            change_7d: metrics.change_7d,
            high_24h: metrics.high_24h,
            low_24h: metrics.low_24h,
            timestamp: Utc::now(),
        };
        self.write_cached(&key, &snapshot, Duration::from_secs(self.config.price_ttl_secs))
            .await;
        Ok(snapshot)
    }

    /// Suggest a symmetric price band for a hypothetical position. The
    /// expected yield rises as the band narrows, capped at 50%.
    pub async fn get_optimal_range(
        &self,
        pair_id: &str,
        tolerance: RiskTolerance,
    ) -> Result<OptimalRange, MarketError> {
        let pool = self.get_pool_snapshot(pair_id).await?;
        let price = self.get_price_snapshot(pair_id).await?.current_price;

        let width = range_width(tolerance);
        let expected_yield =
            (pool.apy * (YIELD_REFERENCE_WIDTH / width)).min(MAX_EXPECTED_YIELD_PCT);

        Ok(OptimalRange {
            lower: price * (1.0 - width),
            upper: price * (1.0 + width),
            expected_yield,
        })
    }

    /// Closed-form realized loss vs. holding; see [`estimate_realized_loss`].
    pub fn estimate_realized_loss(
        &self,
        initial_ratio: f64,
        current_ratio: f64,
    ) -> Result<f64, MarketError> {
        estimate_realized_loss(initial_ratio, current_ratio)
    }

    /// Purge every cached pool and price entry. Operator-triggered
    /// invalidation; entries are otherwise never proactively evicted.
    pub async fn clear_cache(&self) {
        self.cache.delete_prefix("pool:").await;
        self.cache.delete_prefix("price:").await;
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        inflight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn read_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.cache.get(key).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }

    async fn write_cached<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.cache.set(key, bytes, ttl).await,
            Err(e) => warn!(key, error = %e, "failed to serialize cache entry"),
        }
    }
}

/// Risk-tolerance-to-band-width table: low ±5%, medium ±10%, high ±20%
fn range_width(tolerance: RiskTolerance) -> f64 {
    match tolerance {
        RiskTolerance::Low => 0.05,
        RiskTolerance::Medium => 0.10,
        RiskTolerance::High => 0.20,
    }
}
