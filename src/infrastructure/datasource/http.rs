//! HTTP-backed market data source

use crate::domain::market::{MarketDataSource, PoolMetrics, PriceMetrics};
use crate::shared::errors::MarketError;
use async_trait::async_trait;
use reqwest::StatusCode;

/// Real data source talking to a JSON pool-metrics API. Any transport or
/// decode failure is reported uniformly as `MarketError::Upstream`; a 404
/// means the source has no record for the address.
pub struct HttpDataSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDataSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, MarketError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketError::Upstream(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| MarketError::Upstream(e.to_string()))?;

        let value = response
            .json::<T>()
            .await
            .map_err(|e| MarketError::Upstream(e.to_string()))?;
        Ok(Some(value))
    }
}

#[async_trait]
impl MarketDataSource for HttpDataSource {
    async fn fetch_pool_metrics(&self, address: &str) -> Result<Option<PoolMetrics>, MarketError> {
        self.fetch_json(&format!("pools/{}", address)).await
    }

    async fn fetch_price_metrics(
        &self,
        address: &str,
        _base_price: f64,
    ) -> Result<Option<PriceMetrics>, MarketError> {
        self.fetch_json(&format!("prices/{}", address)).await
    }
}
