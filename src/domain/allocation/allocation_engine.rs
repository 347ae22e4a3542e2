//! Portfolio construction over live pool data

use super::metrics::{correlation_score, hedge_ratio, portfolio_risk_tier};
use super::weights::{apply_hedge_adjustment, base_weights, normalize};
use crate::domain::market::{estimate_realized_loss, MarketDataClient};
use crate::domain::registry::PoolRegistry;
use crate::shared::config::AllocationConfig;
use crate::shared::errors::AllocationError;
use crate::shared::types::{
    AllocatedPool, OptimalRange, PairConfig, PoolSnapshot, PortfolioResult, PriceTick,
    RiskTolerance, Trend,
};
use crate::shared::utils::generate_id;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Ticks below this absolute percent change do not disturb a computed
/// portfolio
const MERGE_THRESHOLD_PCT: f64 = 2.0;

struct ResolvedPool {
    pair: PairConfig,
    snapshot: PoolSnapshot,
    range: OptimalRange,
    estimated_loss_pct: f64,
}

/// Turns an investment amount, a pair selection and a risk tolerance into
/// a weighted portfolio. Pairs whose market data cannot be fetched are
/// skipped rather than failing the whole computation.
pub struct AllocationEngine {
    registry: Arc<PoolRegistry>,
    client: Arc<MarketDataClient>,
    config: AllocationConfig,
}

impl AllocationEngine {
    pub fn new(
        registry: Arc<PoolRegistry>,
        client: Arc<MarketDataClient>,
        config: AllocationConfig,
    ) -> Self {
        Self {
            registry,
            client,
            config,
        }
    }

    pub async fn compute_allocation(
        &self,
        total_investment: f64,
        selected_pair_ids: &[&str],
        tolerance: RiskTolerance,
    ) -> Result<PortfolioResult, AllocationError> {
        if !total_investment.is_finite() || total_investment <= 0.0 {
            return Err(AllocationError::InvalidInput(format!(
                "investment must be positive, got {}",
                total_investment
            )));
        }
        if selected_pair_ids.is_empty() {
            return Err(AllocationError::InvalidInput(
                "no pairs selected".to_string(),
            ));
        }

        let resolved = self.resolve_pools(selected_pair_ids, tolerance).await;
        if resolved.is_empty() {
            return Err(AllocationError::NoDataAvailable);
        }

        let pair_refs: Vec<&PairConfig> = resolved.iter().map(|r| &r.pair).collect();
        let mut weights = base_weights(&pair_refs, tolerance);

        let avg_abs_change = resolved
            .iter()
            .map(|r| r.snapshot.price_change_24h.abs())
            .sum::<f64>()
            / resolved.len() as f64;
        apply_hedge_adjustment(
            &mut weights,
            &self.registry.hedge_pair().id,
            avg_abs_change,
            &self.config,
        );
        normalize(&mut weights);

        let mut pools = Vec::with_capacity(resolved.len());
        let mut weighted_pairs = Vec::with_capacity(resolved.len());
        for entry in &resolved {
            let weight = weights.get(&entry.pair.id).copied().unwrap_or(0.0);
            weighted_pairs.push((&entry.pair, weight));
            pools.push(AllocatedPool {
                pair_id: entry.pair.id.clone(),
                name: entry.pair.name.clone(),
                current_price: entry.snapshot.current_price,
                price_change_24h: entry.snapshot.price_change_24h,
                apy: entry.snapshot.apy,
                trend: Trend::from_change(entry.snapshot.price_change_24h),
                estimated_loss_pct: entry.estimated_loss_pct,
                optimal_range: entry.range.clone(),
                amount: total_investment * weight,
                allocation_percent: weight * 100.0,
            });
        }

        let expected_daily_yield = pools
            .iter()
            .map(|p| p.amount * (p.apy / 100.0) / 365.0)
            .sum::<f64>();
        let pair_ids: Vec<String> = resolved.iter().map(|r| r.pair.id.clone()).collect();

        let result = PortfolioResult {
            id: generate_id(),
            total_investment,
            expected_daily_yield,
            expected_daily_yield_percent: expected_daily_yield / total_investment * 100.0,
            risk_tier: portfolio_risk_tier(&weighted_pairs),
            hedge_ratio: hedge_ratio(&weighted_pairs),
            correlation_score: correlation_score(&self.registry, &pair_ids),
            pools,
            computed_at: Utc::now(),
        };
        info!(
            portfolio_id = %result.id,
            pools = result.pools.len(),
            tolerance = %tolerance,
            "portfolio computed"
        );
        Ok(result)
    }

    /// Fetch snapshot, optimal range and loss estimate for each selected
    /// pair, dropping duplicates, unknown ids and pairs whose data fetch
    /// fails.
    async fn resolve_pools(
        &self,
        selected_pair_ids: &[&str],
        tolerance: RiskTolerance,
    ) -> Vec<ResolvedPool> {
        let mut resolved = Vec::with_capacity(selected_pair_ids.len());
        let mut seen = HashSet::new();
        for &pair_id in selected_pair_ids {
            if !seen.insert(pair_id) {
                continue;
            }
            let pair = match self.registry.get(pair_id) {
                Some(pair) => pair.clone(),
                None => {
                    warn!(pair_id, "unknown pair skipped");
                    continue;
                }
            };
            let snapshot = match self.client.get_pool_snapshot(pair_id).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(pair_id, error = %e, "pair skipped, pool data unavailable");
                    continue;
                }
            };
            let range = match self.client.get_optimal_range(pair_id, tolerance).await {
                Ok(range) => range,
                Err(e) => {
                    warn!(pair_id, error = %e, "pair skipped, range unavailable");
                    continue;
                }
            };
            let ratio = 1.0 + snapshot.price_change_24h / 100.0;
            let estimated_loss_pct = estimate_realized_loss(1.0, ratio).unwrap_or(0.0);
            resolved.push(ResolvedPool {
                pair,
                snapshot,
                range,
                estimated_loss_pct,
            });
        }
        resolved
    }
}

/// Fold a live tick into an already computed portfolio. Small moves are
/// ignored; a move past the threshold refreshes the affected pool's price
/// and trend. Returns whether the result changed.
pub fn merge_tick(result: &mut PortfolioResult, tick: &PriceTick) -> bool {
    if tick.change_percent.abs() <= MERGE_THRESHOLD_PCT {
        return false;
    }
    match result.pools.iter_mut().find(|p| p.pair_id == tick.pair_id) {
        Some(pool) => {
            pool.current_price = tick.price;
            pool.trend = Trend::from_change(tick.change_percent);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{MarketDataSource, PoolMetrics, PriceMetrics};
    use crate::infrastructure::cache::MemoryCacheStore;
    use crate::shared::config::CacheConfig;
    use crate::shared::errors::MarketError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Serves fixed pool metrics per address; unknown addresses report no
    /// data.
    struct MapSource {
        pools: HashMap<String, PoolMetrics>,
    }

    impl MapSource {
        fn for_pairs(registry: &PoolRegistry, entries: &[(&str, f64, f64, f64)]) -> Self {
            let mut pools = HashMap::new();
            for &(pair_id, price, change_24h, apy) in entries {
                let address = registry.get(pair_id).unwrap().address.clone();
                pools.insert(
                    address,
                    PoolMetrics {
                        price,
                        price_change_24h: change_24h,
                        liquidity: 1_000_000.0,
                        volume_24h: 250_000.0,
                        apy,
                        tvl: 3_000_000.0,
                        fee_rate: 0.0025,
                    },
                );
            }
            Self { pools }
        }
    }

    #[async_trait]
    impl MarketDataSource for MapSource {
        async fn fetch_pool_metrics(
            &self,
            address: &str,
        ) -> Result<Option<PoolMetrics>, MarketError> {
            Ok(self.pools.get(address).cloned())
        }

        async fn fetch_price_metrics(
            &self,
            address: &str,
            base_price: f64,
        ) -> Result<Option<PriceMetrics>, MarketError> {
            if !self.pools.contains_key(address) {
                return Ok(None);
            }
            Ok(Some(PriceMetrics {
                price: base_price,
                change_24h: 0.0,
                change_7d: 0.0,
                high_24h: base_price * 1.02,
                low_24h: base_price * 0.98,
            }))
        }
    }

    fn engine_with(source: MapSource) -> AllocationEngine {
        let registry = Arc::new(PoolRegistry::builtin());
        let client = Arc::new(MarketDataClient::new(
            registry.clone(),
            Arc::new(source),
            Arc::new(MemoryCacheStore::new()),
            CacheConfig::default(),
        ));
        AllocationEngine::new(registry, client, AllocationConfig::default())
    }

    fn calm_sol_eurc_engine() -> AllocationEngine {
        let registry = PoolRegistry::builtin();
        engine_with(MapSource::for_pairs(
            &registry,
            &[("SOL_USDC", 150.0, 2.0, 24.5), ("EURC_USDC", 1.08, 0.3, 6.8)],
        ))
    }

    #[tokio::test]
    async fn test_rejects_non_positive_investment() {
        let engine = calm_sol_eurc_engine();
        for amount in [0.0, -100.0, f64::NAN] {
            let err = engine
                .compute_allocation(amount, &["SOL_USDC"], RiskTolerance::Medium)
                .await
                .unwrap_err();
            assert!(matches!(err, AllocationError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn test_rejects_empty_selection() {
        let engine = calm_sol_eurc_engine();
        let err = engine
            .compute_allocation(10_000.0, &[], RiskTolerance::Medium)
            .await
            .unwrap_err();
        assert!(matches!(err, AllocationError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_medium_two_pair_allocation() {
        let engine = calm_sol_eurc_engine();
        let result = engine
            .compute_allocation(10_000.0, &["SOL_USDC", "EURC_USDC"], RiskTolerance::Medium)
            .await
            .unwrap();

        assert_eq!(result.pools.len(), 2);
        let sol = result.pools.iter().find(|p| p.pair_id == "SOL_USDC").unwrap();
        let eurc = result
            .pools
            .iter()
            .find(|p| p.pair_id == "EURC_USDC")
            .unwrap();

        // base weights 0.25 / 0.20 normalized to 5/9 and 4/9
        assert!((sol.amount - 5555.56).abs() < 1.0);
        assert!((eurc.amount - 4444.44).abs() < 1.0);
        assert!((sol.allocation_percent + eurc.allocation_percent - 100.0).abs() < 1e-9);
        assert_eq!(sol.trend, Trend::Stable);
    }

    #[tokio::test]
    async fn test_amounts_sum_to_investment() {
        let registry = PoolRegistry::builtin();
        let engine = engine_with(MapSource::for_pairs(
            &registry,
            &[
                ("SOL_USDC", 150.0, 1.0, 24.5),
                ("ETH_USDC", 3200.0, -1.5, 18.0),
                ("RAY_USDC", 2.85, 3.0, 45.0),
                ("EURC_USDC", 1.08, 0.2, 6.8),
            ],
        ));
        for tolerance in [RiskTolerance::Low, RiskTolerance::Medium, RiskTolerance::High] {
            let result = engine
                .compute_allocation(
                    25_000.0,
                    &["SOL_USDC", "ETH_USDC", "RAY_USDC", "EURC_USDC"],
                    tolerance,
                )
                .await
                .unwrap();
            let total: f64 = result.pools.iter().map(|p| p.amount).sum();
            assert!((total - 25_000.0).abs() < 1e-6, "tolerance {:?}", tolerance);
            let pct: f64 = result.pools.iter().map(|p| p.allocation_percent).sum();
            assert!((pct - 100.0).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_volatile_market_boosts_hedge_pair() {
        let registry = PoolRegistry::builtin();
        let engine = engine_with(MapSource::for_pairs(
            &registry,
            &[("SOL_USDC", 150.0, 6.0, 24.5), ("EURC_USDC", 1.08, 6.0, 6.8)],
        ));
        let result = engine
            .compute_allocation(10_000.0, &["SOL_USDC", "EURC_USDC"], RiskTolerance::Medium)
            .await
            .unwrap();

        let sol = result.pools.iter().find(|p| p.pair_id == "SOL_USDC").unwrap();
        let eurc = result
            .pools
            .iter()
            .find(|p| p.pair_id == "EURC_USDC")
            .unwrap();
        // 0.25/0.20 becomes 0.15/0.30 before normalization
        assert!(eurc.allocation_percent > sol.allocation_percent);
        assert!((eurc.allocation_percent - 200.0 / 3.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_pairs_without_data_are_skipped() {
        let registry = PoolRegistry::builtin();
        let engine = engine_with(MapSource::for_pairs(
            &registry,
            &[("SOL_USDC", 150.0, 2.0, 24.5)],
        ));
        let result = engine
            .compute_allocation(10_000.0, &["SOL_USDC", "ETH_USDC"], RiskTolerance::Medium)
            .await
            .unwrap();

        assert_eq!(result.pools.len(), 1);
        assert_eq!(result.pools[0].pair_id, "SOL_USDC");
        assert!((result.pools[0].amount - 10_000.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_no_resolvable_pairs_is_no_data() {
        let registry = PoolRegistry::builtin();
        let engine = engine_with(MapSource::for_pairs(&registry, &[]));
        let err = engine
            .compute_allocation(10_000.0, &["SOL_USDC", "ETH_USDC"], RiskTolerance::Medium)
            .await
            .unwrap_err();
        assert!(matches!(err, AllocationError::NoDataAvailable));
    }

    #[tokio::test]
    async fn test_duplicate_selection_collapses() {
        let engine = calm_sol_eurc_engine();
        let result = engine
            .compute_allocation(
                10_000.0,
                &["SOL_USDC", "SOL_USDC", "EURC_USDC"],
                RiskTolerance::Medium,
            )
            .await
            .unwrap();
        assert_eq!(result.pools.len(), 2);
    }

    #[tokio::test]
    async fn test_portfolio_metrics_populated() {
        let registry = PoolRegistry::builtin();
        let engine = engine_with(MapSource::for_pairs(
            &registry,
            &[
                ("SOL_USDC", 150.0, 2.0, 24.5),
                ("ETH_USDC", 3200.0, 1.0, 18.0),
            ],
        ));
        let result = engine
            .compute_allocation(10_000.0, &["SOL_USDC", "ETH_USDC"], RiskTolerance::Medium)
            .await
            .unwrap();

        assert_eq!(result.risk_tier, crate::shared::types::RiskTier::Medium);
        assert_eq!(result.hedge_ratio, 0.0);
        assert!((result.correlation_score - 0.85).abs() < 1e-9);
        assert!(result.expected_daily_yield > 0.0);
        assert!(
            (result.expected_daily_yield_percent
                - result.expected_daily_yield / 10_000.0 * 100.0)
                .abs()
                < 1e-9
        );
    }

    #[tokio::test]
    async fn test_merge_tick_threshold_and_update() {
        let engine = calm_sol_eurc_engine();
        let mut result = engine
            .compute_allocation(10_000.0, &["SOL_USDC", "EURC_USDC"], RiskTolerance::Medium)
            .await
            .unwrap();
        let original_amount = result.pools[0].amount;

        let small = PriceTick {
            pair_id: "SOL_USDC".to_string(),
            price: 151.0,
            change_percent: 0.7,
            timestamp: Utc::now(),
        };
        assert!(!merge_tick(&mut result, &small));

        let large = PriceTick {
            pair_id: "SOL_USDC".to_string(),
            price: 160.0,
            change_percent: 6.7,
            timestamp: Utc::now(),
        };
        assert!(merge_tick(&mut result, &large));
        let sol = result.pools.iter().find(|p| p.pair_id == "SOL_USDC").unwrap();
        assert_eq!(sol.current_price, 160.0);
        assert_eq!(sol.trend, Trend::Bull);
        // allocation amounts are not rebalanced by ticks
        assert_eq!(result.pools[0].amount, original_amount);

        let unknown = PriceTick {
            pair_id: "DOGE_USDC".to_string(),
            price: 1.0,
            change_percent: 9.0,
            timestamp: Utc::now(),
        };
        assert!(!merge_tick(&mut result, &unknown));
    }
}
