//! Market domain - pool/price data access through a freshness-bounded cache

mod loss;
mod market_data_client;

pub use loss::estimate_realized_loss;
pub use market_data_client::MarketDataClient;

use crate::shared::errors::MarketError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw pool metrics as returned by an upstream data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolMetrics {
    pub price: f64,
    pub price_change_24h: f64,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub apy: f64,
    pub tvl: f64,
    pub fee_rate: f64,
}

/// Raw price metrics as returned by an upstream data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceMetrics {
    pub price: f64,
    pub change_24h: f64,
    pub change_7d: f64,
    pub high_24h: f64,
    pub low_24h: f64,
}

/// Upstream data source, keyed by on-chain pool address.
///
/// `Ok(None)` means the source has no record for the address; transport or
/// decode failures surface as `MarketError::Upstream`.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_pool_metrics(&self, address: &str) -> Result<Option<PoolMetrics>, MarketError>;

    /// `base_price` is the pool's last known base price; simulated sources
    /// derive the live price from it, real sources may ignore it.
    async fn fetch_price_metrics(
        &self,
        address: &str,
        base_price: f64,
    ) -> Result<Option<PriceMetrics>, MarketError>;
}

/// Cache backing store with TTL semantics.
///
/// The client is agnostic to whether entries live in memory or are
/// persisted, as long as expired entries read as misses.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<u8>>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);
    async fn delete_prefix(&self, prefix: &str);
}
