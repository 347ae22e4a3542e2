//! Simulated upstream data source with hardcoded per-address records

use crate::domain::market::{MarketDataSource, PoolMetrics, PriceMetrics};
use crate::domain::registry::PoolRegistry;
use crate::shared::errors::MarketError;
use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;

/// Seed record backing one pool address
#[derive(Debug, Clone)]
struct PoolSeed {
    base_price: f64,
    price_change_24h: f64,
    liquidity: f64,
    volume_24h: f64,
    apy: f64,
    tvl: f64,
    fee_rate: f64,
    change_7d: f64,
}

/// Heuristic stand-in for a real market data source. Serves hardcoded
/// records keyed by pool address with a small random walk on prices, so a
/// real implementation is a drop-in replacement behind [`MarketDataSource`].
pub struct SimulatedDataSource {
    records: HashMap<String, PoolSeed>,
}

impl SimulatedDataSource {
    /// Seed one record for every pair in the registry.
    pub fn for_registry(registry: &PoolRegistry) -> Self {
        let mut records = HashMap::new();
        for pair in registry.all() {
            if let Some(seed) = seed_for(&pair.id) {
                records.insert(pair.address.clone(), seed);
            }
        }
        Self { records }
    }
}

#[async_trait]
impl MarketDataSource for SimulatedDataSource {
    async fn fetch_pool_metrics(&self, address: &str) -> Result<Option<PoolMetrics>, MarketError> {
        let seed = match self.records.get(address) {
            Some(seed) => seed,
            None => return Ok(None),
        };
        let jitter: f64 = rand::thread_rng().gen_range(-0.002..=0.002);
        Ok(Some(PoolMetrics {
            price: seed.base_price * (1.0 + jitter),
            price_change_24h: seed.price_change_24h,
            liquidity: seed.liquidity,
            volume_24h: seed.volume_24h,
            apy: seed.apy,
            tvl: seed.tvl,
            fee_rate: seed.fee_rate,
        }))
    }

    async fn fetch_price_metrics(
        &self,
        address: &str,
        base_price: f64,
    ) -> Result<Option<PriceMetrics>, MarketError> {
        let seed = match self.records.get(address) {
            Some(seed) => seed,
            None => return Ok(None),
        };
        let jitter: f64 = rand::thread_rng().gen_range(-0.003..=0.003);
        let price = base_price * (1.0 + jitter);
        let swing = (seed.price_change_24h.abs() / 100.0).max(0.005);
        Ok(Some(PriceMetrics {
            price,
            change_24h: seed.price_change_24h,
            change_7d: seed.change_7d,
            high_24h: price * (1.0 + swing),
            low_24h: price * (1.0 - swing),
        }))
    }
}

fn seed_for(pair_id: &str) -> Option<PoolSeed> {
    let seed = match pair_id {
        "SOL_USDC" => PoolSeed {
            base_price: 150.0,
            price_change_24h: 2.5,
            liquidity: 12_500_000.0,
            volume_24h: 45_000_000.0,
            apy: 24.5,
            tvl: 18_000_000.0,
            fee_rate: 0.0025,
            change_7d: 5.2,
        },
        "ETH_USDC" => PoolSeed {
            base_price: 3_200.0,
            price_change_24h: 1.8,
            liquidity: 22_000_000.0,
            volume_24h: 60_000_000.0,
            apy: 18.2,
            tvl: 31_000_000.0,
            fee_rate: 0.003,
            change_7d: 3.4,
        },
        "BTC_USDC" => PoolSeed {
            base_price: 64_000.0,
            price_change_24h: 1.1,
            liquidity: 35_000_000.0,
            volume_24h: 80_000_000.0,
            apy: 12.4,
            tvl: 52_000_000.0,
            fee_rate: 0.003,
            change_7d: 2.1,
        },
        "RAY_USDC" => PoolSeed {
            base_price: 2.85,
            price_change_24h: 4.6,
            liquidity: 3_200_000.0,
            volume_24h: 9_500_000.0,
            apy: 45.0,
            tvl: 4_800_000.0,
            fee_rate: 0.0025,
            change_7d: 11.3,
        },
        "JUP_USDC" => PoolSeed {
            base_price: 0.92,
            price_change_24h: -3.2,
            liquidity: 2_700_000.0,
            volume_24h: 7_800_000.0,
            apy: 38.5,
            tvl: 3_900_000.0,
            fee_rate: 0.003,
            change_7d: -6.8,
        },
        "EURC_USDC" => PoolSeed {
            base_price: 1.08,
            price_change_24h: 0.3,
            liquidity: 8_400_000.0,
            volume_24h: 5_200_000.0,
            apy: 6.8,
            tvl: 9_600_000.0,
            fee_rate: 0.0001,
            change_7d: 0.6,
        },
        "USDT_USDC" => PoolSeed {
            base_price: 1.0,
            price_change_24h: 0.05,
            liquidity: 40_000_000.0,
            volume_24h: 95_000_000.0,
            apy: 5.2,
            tvl: 58_000_000.0,
            fee_rate: 0.0001,
            change_7d: 0.1,
        },
        _ => return None,
    };
    Some(seed)
}
