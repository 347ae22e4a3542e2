//! Liquidity pool portfolio allocator.
//!
//! Layered along DDD lines: `domain` holds the registry, market data
//! access, price streaming and allocation logic; `infrastructure` the
//! cache and data source backends; `application` the CLI wiring.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use domain::allocation::AllocationEngine;
pub use domain::market::MarketDataClient;
pub use domain::registry::PoolRegistry;
pub use domain::stream::PriceStream;
