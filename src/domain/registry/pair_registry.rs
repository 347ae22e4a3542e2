//! Registry of supported liquidity-pool trading pairs

use super::correlation::CorrelationTable;
use crate::shared::errors::AppError;
use crate::shared::types::{HedgeClass, PairConfig, RiskTier};
use std::collections::HashMap;

/// Authoritative, read-only list of supported pairs with their risk tiers,
/// hedge classifications and pairwise correlations. Loaded once at startup.
#[derive(Debug, Clone)]
pub struct PoolRegistry {
    pairs: Vec<PairConfig>,
    index: HashMap<String, usize>,
    correlations: CorrelationTable,
    hedge_pair_idx: usize,
}

impl PoolRegistry {
    /// Build a registry from a pair list, enforcing unique identifiers.
    /// `hedge_pair_id` names the pair the hedge-boost policy targets.
    pub fn new(
        pairs: Vec<PairConfig>,
        correlations: CorrelationTable,
        hedge_pair_id: &str,
    ) -> Result<Self, AppError> {
        let mut index = HashMap::with_capacity(pairs.len());
        for (i, pair) in pairs.iter().enumerate() {
            if index.insert(pair.id.clone(), i).is_some() {
                return Err(AppError::ConfigError(format!(
                    "duplicate pair id in registry: {}",
                    pair.id
                )));
            }
        }
        let hedge_pair_idx = *index.get(hedge_pair_id).ok_or_else(|| {
            AppError::ConfigError(format!("hedge pair {} not in registry", hedge_pair_id))
        })?;
        Ok(Self {
            pairs,
            index,
            correlations,
            hedge_pair_idx,
        })
    }

    /// The built-in mainnet pair set.
    pub fn builtin() -> Self {
        let pairs = vec![
            pair("SOL_USDC", "SOL/USDC", "58oQChx4yWmvKdwLLZzBi4ChoCc2fqCUWBkwMihLYQo2",
                 "SOL", "USDC", RiskTier::Medium, HedgeClass::Bluechip, Some(0.25)),
            pair("ETH_USDC", "ETH/USDC", "EoNrn8iUhwgJySD1pHu8Qxm5gSQqLK3za4m8xzD2RuEb",
                 "ETH", "USDC", RiskTier::Medium, HedgeClass::Bluechip, Some(0.25)),
            pair("BTC_USDC", "BTC/USDC", "6UmmUiYoBjSrhakAobJw8BvkmJtDVxaeBtbt7rxWo1mg",
                 "BTC", "USDC", RiskTier::Low, HedgeClass::Bluechip, Some(0.30)),
            pair("RAY_USDC", "RAY/USDC", "AVs9TA4nWDzfPJE9gGVNJMVhcQy3V9PGazuz33BfG2RA",
                 "RAY", "USDC", RiskTier::High, HedgeClass::Bluechip, Some(0.15)),
            pair("JUP_USDC", "JUP/USDC", "C1MgLojNLWBKADvu9BHdtgzz1oZX4dZ5zGdGcgvvW8Wz",
                 "JUP", "USDC", RiskTier::High, HedgeClass::Bluechip, Some(0.10)),
            pair("EURC_USDC", "EURC/USDC", "HxFLKUAmAMLz1jtT3hbvCMELwH5H9tpM2QugP8sKyfhW",
                 "EURC", "USDC", RiskTier::Low, HedgeClass::Hedge, Some(0.20)),
            pair("USDT_USDC", "USDT/USDC", "77quYg4MGneUdjgXCunt9GgM1usmrxKY31twEy3WHwcS",
                 "USDT", "USDC", RiskTier::Low, HedgeClass::Stablecoin, Some(0.15)),
        ];

        let mut correlations = CorrelationTable::new();
        correlations.insert("SOL_USDC", "ETH_USDC", 0.85);
        correlations.insert("SOL_USDC", "BTC_USDC", 0.80);
        correlations.insert("ETH_USDC", "BTC_USDC", 0.90);
        correlations.insert("SOL_USDC", "RAY_USDC", 0.75);
        correlations.insert("SOL_USDC", "JUP_USDC", 0.70);
        correlations.insert("ETH_USDC", "RAY_USDC", 0.60);
        correlations.insert("ETH_USDC", "JUP_USDC", 0.55);
        correlations.insert("BTC_USDC", "RAY_USDC", 0.55);
        correlations.insert("BTC_USDC", "JUP_USDC", 0.50);
        correlations.insert("RAY_USDC", "JUP_USDC", 0.65);
        correlations.insert("SOL_USDC", "EURC_USDC", -0.10);
        correlations.insert("ETH_USDC", "EURC_USDC", -0.05);
        correlations.insert("BTC_USDC", "EURC_USDC", -0.05);
        correlations.insert("SOL_USDC", "USDT_USDC", 0.05);
        correlations.insert("EURC_USDC", "USDT_USDC", 0.20);

        Self::new(pairs, correlations, "EURC_USDC").expect("builtin registry is valid")
    }

    /// Look up a pair by identifier
    pub fn get(&self, pair_id: &str) -> Option<&PairConfig> {
        self.index.get(pair_id).map(|&i| &self.pairs[i])
    }

    pub fn contains(&self, pair_id: &str) -> bool {
        self.index.contains_key(pair_id)
    }

    /// All registered pairs, in registration order
    pub fn all(&self) -> &[PairConfig] {
        &self.pairs
    }

    /// The designated hedge pair targeted by the hedge-boost policy
    pub fn hedge_pair(&self) -> &PairConfig {
        &self.pairs[self.hedge_pair_idx]
    }

    /// Correlation between two pairs (0.0 when unknown)
    pub fn correlation(&self, a: &str, b: &str) -> f64 {
        self.correlations.get(a, b)
    }
}

#[allow(clippy::too_many_arguments)]
fn pair(
    id: &str,
    name: &str,
    address: &str,
    token_a: &str,
    token_b: &str,
    risk_tier: RiskTier,
    hedge_class: HedgeClass,
    default_weight: Option<f64>,
) -> PairConfig {
    PairConfig {
        id: id.to_string(),
        name: name.to_string(),
        address: address.to_string(),
        token_a: token_a.to_string(),
        token_b: token_b.to_string(),
        risk_tier,
        hedge_class,
        default_weight,
    }
}
