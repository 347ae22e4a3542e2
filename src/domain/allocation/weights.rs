//! Weighting policy: base weights per risk tolerance, hedge adjustment,
//! and normalization

use crate::shared::config::AllocationConfig;
use crate::shared::types::{HedgeClass, PairConfig, RiskTier, RiskTolerance};
use std::collections::HashMap;

/// Share split evenly across defensive pairs under low tolerance
const LOW_DEFENSIVE_SHARE: f64 = 0.35;
/// Share split evenly across the remaining pairs under low tolerance
const LOW_REMAINDER_SHARE: f64 = 0.30;
/// Share split evenly across high-tier pairs under high tolerance
const HIGH_AGGRESSIVE_SHARE: f64 = 0.50;
/// Flat weight for dedicated hedge pairs under high tolerance
const HIGH_HEDGE_WEIGHT: f64 = 0.15;
/// Share split evenly across the remaining pairs under high tolerance
const HIGH_REMAINDER_SHARE: f64 = 0.35;
/// Fallback weight when a pair has no configured default
const DEFAULT_PAIR_WEIGHT: f64 = 0.20;

/// Compute pre-normalization base weights for the selected pairs.
///
/// The shares deliberately do not sum to 1; normalization corrects that.
/// The even splits are by the actual count of matching pairs in the
/// selection, not a fixed assumed count.
pub fn base_weights(pairs: &[&PairConfig], tolerance: RiskTolerance) -> HashMap<String, f64> {
    let mut weights = HashMap::with_capacity(pairs.len());
    match tolerance {
        RiskTolerance::Low => {
            let defensive = pairs.iter().filter(|p| p.hedge_class.is_defensive()).count();
            let remainder = pairs.len() - defensive;
            for pair in pairs {
                let weight = if pair.hedge_class.is_defensive() {
                    LOW_DEFENSIVE_SHARE / defensive as f64
                } else {
                    LOW_REMAINDER_SHARE / remainder as f64
                };
                weights.insert(pair.id.clone(), weight);
            }
        }
        RiskTolerance::High => {
            let aggressive = pairs
                .iter()
                .filter(|p| p.risk_tier == RiskTier::High)
                .count();
            let remainder = pairs
                .iter()
                .filter(|p| p.risk_tier != RiskTier::High && p.hedge_class != HedgeClass::Hedge)
                .count();
            for pair in pairs {
                let weight = if pair.risk_tier == RiskTier::High {
                    HIGH_AGGRESSIVE_SHARE / aggressive as f64
                } else if pair.hedge_class == HedgeClass::Hedge {
                    HIGH_HEDGE_WEIGHT
                } else {
                    HIGH_REMAINDER_SHARE / remainder as f64
                };
                weights.insert(pair.id.clone(), weight);
            }
        }
        RiskTolerance::Medium => {
            for pair in pairs {
                weights.insert(
                    pair.id.clone(),
                    pair.default_weight.unwrap_or(DEFAULT_PAIR_WEIGHT),
                );
            }
        }
    }
    weights
}

/// Boost the designated hedge pair when the market turns volatile.
///
/// Applies when the average absolute 24h change exceeds the trigger: the
/// hedge pair gains up to `hedge_boost` (total capped at `hedge_cap`) and
/// the boost is subtracted evenly from the other pairs, each floored at
/// `weight_floor`.
pub fn apply_hedge_adjustment(
    weights: &mut HashMap<String, f64>,
    hedge_pair_id: &str,
    avg_abs_change_24h: f64,
    config: &AllocationConfig,
) {
    if avg_abs_change_24h <= config.hedge_trigger_pct {
        return;
    }
    let current = match weights.get(hedge_pair_id) {
        Some(&w) => w,
        None => return,
    };
    let others: Vec<String> = weights
        .keys()
        .filter(|id| id.as_str() != hedge_pair_id)
        .cloned()
        .collect();
    if others.is_empty() {
        return;
    }

    let boost = (config.hedge_cap - current).clamp(0.0, config.hedge_boost);
    if boost <= 0.0 {
        return;
    }

    weights.insert(hedge_pair_id.to_string(), current + boost);
    let share = boost / others.len() as f64;
    for id in others {
        let reduced = (weights[&id] - share).max(config.weight_floor);
        weights.insert(id, reduced);
    }
}

/// Scale weights so they sum to exactly 1.
pub fn normalize(weights: &mut HashMap<String, f64>) {
    let total: f64 = weights.values().sum();
    if total <= 0.0 {
        return;
    }
    for weight in weights.values_mut() {
        *weight /= total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry::PoolRegistry;

    const EPS: f64 = 1e-9;

    fn pairs<'a>(registry: &'a PoolRegistry, ids: &[&str]) -> Vec<&'a PairConfig> {
        ids.iter().map(|id| registry.get(id).unwrap()).collect()
    }

    #[test]
    fn test_low_tolerance_splits_by_actual_counts() {
        let registry = PoolRegistry::builtin();
        let selected = pairs(&registry, &["USDT_USDC", "EURC_USDC", "SOL_USDC", "ETH_USDC"]);
        let weights = base_weights(&selected, RiskTolerance::Low);

        assert!((weights["USDT_USDC"] - 0.175).abs() < EPS);
        assert!((weights["EURC_USDC"] - 0.175).abs() < EPS);
        assert!((weights["SOL_USDC"] - 0.15).abs() < EPS);
        assert!((weights["ETH_USDC"] - 0.15).abs() < EPS);
    }

    #[test]
    fn test_high_tolerance_policy() {
        let registry = PoolRegistry::builtin();
        let selected = pairs(&registry, &["RAY_USDC", "JUP_USDC", "EURC_USDC", "SOL_USDC"]);
        let weights = base_weights(&selected, RiskTolerance::High);

        assert!((weights["RAY_USDC"] - 0.25).abs() < EPS);
        assert!((weights["JUP_USDC"] - 0.25).abs() < EPS);
        assert!((weights["EURC_USDC"] - 0.15).abs() < EPS);
        assert!((weights["SOL_USDC"] - 0.35).abs() < EPS);
    }

    #[test]
    fn test_medium_tolerance_uses_registry_defaults() {
        let registry = PoolRegistry::builtin();
        let selected = pairs(&registry, &["SOL_USDC", "EURC_USDC"]);
        let weights = base_weights(&selected, RiskTolerance::Medium);

        assert!((weights["SOL_USDC"] - 0.25).abs() < EPS);
        assert!((weights["EURC_USDC"] - 0.20).abs() < EPS);
    }

    #[test]
    fn test_medium_tolerance_fallback_weight() {
        let registry = PoolRegistry::builtin();
        let mut pair = registry.get("SOL_USDC").unwrap().clone();
        pair.default_weight = None;
        let weights = base_weights(&[&pair], RiskTolerance::Medium);
        assert!((weights["SOL_USDC"] - 0.20).abs() < EPS);
    }

    #[test]
    fn test_hedge_boost_applied_above_trigger() {
        let config = AllocationConfig::default();
        let mut weights = HashMap::from([
            ("SOL_USDC".to_string(), 0.25),
            ("ETH_USDC".to_string(), 0.25),
            ("EURC_USDC".to_string(), 0.20),
        ]);
        apply_hedge_adjustment(&mut weights, "EURC_USDC", 6.0, &config);

        assert!((weights["EURC_USDC"] - 0.30).abs() < EPS);
        assert!((weights["SOL_USDC"] - 0.20).abs() < EPS);
        assert!((weights["ETH_USDC"] - 0.20).abs() < EPS);
    }

    #[test]
    fn test_hedge_boost_capped_at_forty_percent() {
        let config = AllocationConfig::default();
        let mut weights = HashMap::from([
            ("SOL_USDC".to_string(), 0.30),
            ("EURC_USDC".to_string(), 0.35),
        ]);
        apply_hedge_adjustment(&mut weights, "EURC_USDC", 8.0, &config);
        assert!((weights["EURC_USDC"] - 0.40).abs() < EPS);
    }

    #[test]
    fn test_hedge_boost_respects_weight_floor() {
        let config = AllocationConfig::default();
        let mut weights = HashMap::from([
            ("SOL_USDC".to_string(), 0.06),
            ("ETH_USDC".to_string(), 0.06),
            ("EURC_USDC".to_string(), 0.20),
        ]);
        apply_hedge_adjustment(&mut weights, "EURC_USDC", 6.0, &config);

        assert!(weights["SOL_USDC"] >= config.weight_floor - EPS);
        assert!(weights["ETH_USDC"] >= config.weight_floor - EPS);
        assert!(weights["EURC_USDC"] <= config.hedge_cap + EPS);
    }

    #[test]
    fn test_no_boost_below_trigger_or_without_hedge_pair() {
        let config = AllocationConfig::default();
        let mut weights = HashMap::from([
            ("SOL_USDC".to_string(), 0.25),
            ("EURC_USDC".to_string(), 0.20),
        ]);
        let before = weights.clone();
        apply_hedge_adjustment(&mut weights, "EURC_USDC", 4.0, &config);
        assert_eq!(weights, before);

        let mut without_hedge = HashMap::from([("SOL_USDC".to_string(), 0.25)]);
        let before = without_hedge.clone();
        apply_hedge_adjustment(&mut without_hedge, "EURC_USDC", 9.0, &config);
        assert_eq!(without_hedge, before);
    }

    #[test]
    fn test_normalized_weights_sum_to_one_for_all_tolerances() {
        let registry = PoolRegistry::builtin();
        let selected = pairs(
            &registry,
            &["SOL_USDC", "ETH_USDC", "RAY_USDC", "EURC_USDC", "USDT_USDC"],
        );
        for tolerance in [RiskTolerance::Low, RiskTolerance::Medium, RiskTolerance::High] {
            let mut weights = base_weights(&selected, tolerance);
            apply_hedge_adjustment(&mut weights, "EURC_USDC", 6.0, &AllocationConfig::default());
            normalize(&mut weights);
            let total: f64 = weights.values().sum();
            assert!((total - 1.0).abs() < EPS, "tolerance {:?}", tolerance);
        }
    }

    #[test]
    fn test_medium_scenario_sol_eurc() {
        let registry = PoolRegistry::builtin();
        let selected = pairs(&registry, &["SOL_USDC", "EURC_USDC"]);
        let mut weights = base_weights(&selected, RiskTolerance::Medium);
        normalize(&mut weights);

        assert!((weights["SOL_USDC"] - 0.5556).abs() < 1e-3);
        assert!((weights["EURC_USDC"] - 0.4444).abs() < 1e-3);
    }
}
