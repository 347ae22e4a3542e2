//! Typed events emitted by the price stream

use crate::shared::types::PriceTick;
use chrono::{DateTime, Utc};

/// Severity attached to single-tick price alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Medium,
    High,
}

/// Event stream contract consumed by UI/alerting collaborators.
/// Delivered over a broadcast channel; dropping the receiver unsubscribes.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Connected,
    Disconnected,
    PriceUpdate(PriceTick),
    VolumeUpdate {
        pair_id: String,
        volume_24h: f64,
        timestamp: DateTime<Utc>,
    },
    PriceAlert {
        tick: PriceTick,
        severity: AlertSeverity,
    },
    VolatilityAlert {
        pair_id: String,
        volatility: f64,
        threshold: f64,
        timestamp: DateTime<Utc>,
    },
    Error(String),
    /// Reconnection budget spent; the stream stays disconnected until
    /// `connect()` is called again explicitly.
    ConnectionExhausted,
}
