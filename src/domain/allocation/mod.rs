//! Allocation domain - weighting policy and portfolio construction

mod allocation_engine;
mod metrics;
mod weights;

pub use allocation_engine::{merge_tick, AllocationEngine};
pub use metrics::{correlation_score, hedge_ratio, portfolio_risk_tier};
pub use weights::{apply_hedge_adjustment, base_weights, normalize};
