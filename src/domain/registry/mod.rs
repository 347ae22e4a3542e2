//! Registry domain - static pair configuration and correlations

mod correlation;
mod pair_registry;

pub use correlation::CorrelationTable;
pub use pair_registry::PoolRegistry;
