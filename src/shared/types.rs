//! Common types used across the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Risk tier assigned to a pair in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Numeric score used for the weighted portfolio risk calculation
    pub fn score(&self) -> f64 {
        match self {
            RiskTier::Low => 1.0,
            RiskTier::Medium => 2.0,
            RiskTier::High => 3.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role a pair plays in risk mitigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HedgeClass {
    Bluechip,
    Stablecoin,
    Hedge,
}

impl HedgeClass {
    /// Stablecoin and dedicated hedge pairs count toward the hedge ratio
    pub fn is_defensive(&self) -> bool {
        matches!(self, HedgeClass::Stablecoin | HedgeClass::Hedge)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HedgeClass::Bluechip => "bluechip",
            HedgeClass::Stablecoin => "stablecoin",
            HedgeClass::Hedge => "hedge",
        }
    }
}

impl fmt::Display for HedgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied policy selector shaping weighting aggressiveness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

impl FromStr for RiskTolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskTolerance::Low),
            "medium" => Ok(RiskTolerance::Medium),
            "high" => Ok(RiskTolerance::High),
            other => Err(format!("unknown risk tolerance: {}", other)),
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskTolerance::Low => "low",
            RiskTolerance::Medium => "medium",
            RiskTolerance::High => "high",
        };
        f.write_str(s)
    }
}

/// Immutable configuration of a supported trading pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairConfig {
    pub id: String,
    pub name: String,
    pub address: String,
    pub token_a: String,
    pub token_b: String,
    pub risk_tier: RiskTier,
    pub hedge_class: HedgeClass,
    /// Base weight used by the medium-tolerance policy
    pub default_weight: Option<f64>,
}

/// Point-in-time pool metrics for a pair, cached with a 30s freshness window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pair_id: String,
    pub current_price: f64,
    pub price_change_24h: f64,
    pub liquidity: f64,
    pub volume_24h: f64,
    /// Annualized yield in percent
    pub apy: f64,
    pub tvl: f64,
    pub fee_rate: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Price-focused snapshot, cached independently with a 5s freshness window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub pair_id: String,
    pub current_price: f64,
    pub change_24h: f64,
    pub change_7d: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub timestamp: DateTime<Utc>,
}

/// Ephemeral live price event emitted by the price stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub pair_id: String,
    pub price: f64,
    /// Percent change relative to the previous tick
    pub change_percent: f64,
    pub timestamp: DateTime<Utc>,
}

/// Suggested symmetric price band for a liquidity position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalRange {
    pub lower: f64,
    pub upper: f64,
    /// Expected yield estimate in percent
    pub expected_yield: f64,
}

/// Trend classification derived from a price change percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bull,
    Bear,
    Stable,
}

impl Trend {
    /// Bull above +2%, bear below -2%, stable otherwise
    pub fn from_change(change_percent: f64) -> Self {
        if change_percent > 2.0 {
            Trend::Bull
        } else if change_percent < -2.0 {
            Trend::Bear
        } else {
            Trend::Stable
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Bull => "bull",
            Trend::Bear => "bear",
            Trend::Stable => "stable",
        };
        f.write_str(s)
    }
}

/// A pool with its computed allocation, produced fresh on every computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatedPool {
    pub pair_id: String,
    pub name: String,
    pub current_price: f64,
    pub price_change_24h: f64,
    pub apy: f64,
    pub trend: Trend,
    /// Estimated realized loss vs. holding at the current 24h drift, in percent
    pub estimated_loss_pct: f64,
    pub optimal_range: OptimalRange,
    pub amount: f64,
    pub allocation_percent: f64,
}

/// Complete portfolio allocation returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioResult {
    pub id: String,
    pub total_investment: f64,
    pub expected_daily_yield: f64,
    pub expected_daily_yield_percent: f64,
    pub risk_tier: RiskTier,
    /// Weight share of stablecoin/hedge classified pairs, 0..1
    pub hedge_ratio: f64,
    /// Mean absolute correlation over all unordered selected pairs
    pub correlation_score: f64,
    pub pools: Vec<AllocatedPool>,
    pub computed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_classification() {
        assert_eq!(Trend::from_change(2.5), Trend::Bull);
        assert_eq!(Trend::from_change(-2.5), Trend::Bear);
        assert_eq!(Trend::from_change(2.0), Trend::Stable);
        assert_eq!(Trend::from_change(-2.0), Trend::Stable);
        assert_eq!(Trend::from_change(0.0), Trend::Stable);
    }

    #[test]
    fn test_risk_tolerance_parsing() {
        assert_eq!("Medium".parse::<RiskTolerance>().unwrap(), RiskTolerance::Medium);
        assert_eq!("low".parse::<RiskTolerance>().unwrap(), RiskTolerance::Low);
        assert!("extreme".parse::<RiskTolerance>().is_err());
    }

    #[test]
    fn test_hedge_class_defensive() {
        assert!(HedgeClass::Stablecoin.is_defensive());
        assert!(HedgeClass::Hedge.is_defensive());
        assert!(!HedgeClass::Bluechip.is_defensive());
    }

    #[test]
    fn test_risk_tier_scores() {
        assert_eq!(RiskTier::Low.score(), 1.0);
        assert_eq!(RiskTier::Medium.score(), 2.0);
        assert_eq!(RiskTier::High.score(), 3.0);
    }
}
