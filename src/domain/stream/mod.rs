//! Stream domain - live price feed, alerts and connection lifecycle

mod events;
mod price_stream;
mod volatility;

pub use events::{AlertSeverity, StreamEvent};
pub use price_stream::{PriceStream, StreamState};
pub use volatility::VolatilityMonitor;
