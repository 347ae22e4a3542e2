//! Domain layer - registry, market data, streaming and allocation

pub mod allocation;
pub mod market;
pub mod registry;
pub mod stream;
