//! Portfolio-level summary metrics

use crate::domain::registry::PoolRegistry;
use crate::shared::types::{PairConfig, RiskTier};

/// Weight-average the pair risk scores and round to the nearest tier.
pub fn portfolio_risk_tier(weighted_pairs: &[(&PairConfig, f64)]) -> RiskTier {
    let total: f64 = weighted_pairs.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return RiskTier::Medium;
    }
    let score = weighted_pairs
        .iter()
        .map(|(pair, weight)| pair.risk_tier.score() as f64 * weight)
        .sum::<f64>()
        / total;

    if score < 1.5 {
        RiskTier::Low
    } else if score < 2.5 {
        RiskTier::Medium
    } else {
        RiskTier::High
    }
}

/// Share of total weight sitting in defensive pairs, in 0..=1.
pub fn hedge_ratio(weighted_pairs: &[(&PairConfig, f64)]) -> f64 {
    let total: f64 = weighted_pairs.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return 0.0;
    }
    weighted_pairs
        .iter()
        .filter(|(pair, _)| pair.hedge_class.is_defensive())
        .map(|(_, weight)| weight)
        .sum::<f64>()
        / total
}

/// Mean absolute pairwise correlation across the selected pairs. A
/// single-pair portfolio has no pairwise terms and scores 0.
pub fn correlation_score(registry: &PoolRegistry, pair_ids: &[String]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for (i, a) in pair_ids.iter().enumerate() {
        for b in &pair_ids[i + 1..] {
            sum += registry.correlation(a, b).abs();
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
