//! Live per-pair price feed with reconnect lifecycle and alerting

use super::events::{AlertSeverity, StreamEvent};
use super::volatility::VolatilityMonitor;
use crate::domain::market::MarketDataClient;
use crate::shared::config::StreamConfig;
use crate::shared::errors::StreamError;
use crate::shared::types::PriceTick;
use crate::shared::utils::calculate_percentage_change;
use chrono::Utc;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Duration};
use tracing::{info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Disconnected,
    Connecting,
    Connected,
}

/// Maintains a live price feed for the subscribed pairs: one tick generator
/// per pair on a fixed interval, exponential-backoff reconnection, and
/// volatility/price alerting over the emitted ticks.
///
/// The tick generator is a declared heuristic simulator standing in for a
/// genuine upstream feed; the contract is the tick record's field set and
/// cadence, not the random model.
pub struct PriceStream {
    client: Arc<MarketDataClient>,
    config: StreamConfig,
    state: RwLock<StreamState>,
    subscriptions: RwLock<HashSet<String>>,
    tickers: Mutex<HashMap<String, JoinHandle<()>>>,
    monitors: Arc<RwLock<HashMap<String, VolatilityMonitor>>>,
    events: broadcast::Sender<StreamEvent>,
    attempts: AtomicU32,
}

impl PriceStream {
    pub fn new(client: Arc<MarketDataClient>, config: StreamConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            client,
            config,
            state: RwLock::new(StreamState::Disconnected),
            subscriptions: RwLock::new(HashSet::new()),
            tickers: Mutex::new(HashMap::new()),
            monitors: Arc::new(RwLock::new(HashMap::new())),
            events,
            attempts: AtomicU32::new(0),
        }
    }

    /// Subscribe to the event feed. Dropping the receiver unsubscribes.
    pub fn events(&self) -> broadcast::Receiver<StreamEvent> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> StreamState {
        *self.state.read().await
    }

    /// Establish subscriptions for all registered pairs and start the tick
    /// generators. Idempotent when already connected. A connection failure
    /// invokes the reconnection policy instead of surfacing an error.
    pub async fn connect(&self) {
        {
            let mut state = self.state.write().await;
            if *state == StreamState::Connected {
                return;
            }
            *state = StreamState::Connecting;
        }
        // explicit connect resets the reconnection budget
        self.attempts.store(0, Ordering::SeqCst);
        self.connect_loop().await;
    }

    /// Tear down all tick generators. Always succeeds, idempotent, safe to
    /// call from a failure handler.
    pub async fn disconnect(&self) {
        {
            let mut tickers = self.tickers.lock().await;
            for (_, handle) in tickers.drain() {
                handle.abort();
            }
        }
        let mut state = self.state.write().await;
        if *state != StreamState::Disconnected {
            *state = StreamState::Disconnected;
            let _ = self.events.send(StreamEvent::Disconnected);
            info!("price stream disconnected");
        }
    }

    /// Register interest in additional pairs. Already-subscribed ids and
    /// ids unknown to the registry are no-ops; triggers `connect()` when
    /// not yet connected.
    pub async fn subscribe(&self, pair_ids: &[&str]) {
        let mut added = Vec::new();
        {
            let mut subs = self.subscriptions.write().await;
            for &pair_id in pair_ids {
                if !self.client.registry().contains(pair_id) {
                    warn!(pair_id, "ignoring subscription for unknown pair");
                    continue;
                }
                if subs.insert(pair_id.to_string()) {
                    added.push(pair_id.to_string());
                }
            }
        }

        let state = *self.state.read().await;
        if state != StreamState::Connected {
            self.connect().await;
        } else {
            for pair_id in added {
                self.spawn_ticker(pair_id).await;
            }
        }
    }

    /// Remove interest in pairs, stopping their tick generators.
    pub async fn unsubscribe(&self, pair_ids: &[&str]) {
        {
            let mut subs = self.subscriptions.write().await;
            for &pair_id in pair_ids {
                subs.remove(pair_id);
            }
        }
        {
            let mut tickers = self.tickers.lock().await;
            for &pair_id in pair_ids {
                if let Some(handle) = tickers.remove(pair_id) {
                    handle.abort();
                }
            }
        }
        let mut monitors = self.monitors.write().await;
        for &pair_id in pair_ids {
            monitors.remove(pair_id);
        }
    }

    /// Watch a pair's tick returns and raise `VolatilityAlert` events when
    /// the sliding-window standard deviation exceeds `threshold_percent`.
    pub async fn monitor_volatility(&self, pair_id: &str, threshold_percent: f64) {
        let monitor = VolatilityMonitor::new(
            threshold_percent,
            self.config.volatility_window,
            self.config.volatility_min_samples,
        );
        self.monitors
            .write()
            .await
            .insert(pair_id.to_string(), monitor);
    }

    async fn connect_loop(&self) {
        loop {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            match self.establish().await {
                Ok(()) => {
                    *self.state.write().await = StreamState::Connected;
                    self.attempts.store(0, Ordering::SeqCst);
                    let _ = self.events.send(StreamEvent::Connected);
                    info!("price stream connected");
                    return;
                }
                Err(e) => {
                    warn!(error = %e, attempt = attempt + 1, "price stream connection failed");
                    let _ = self.events.send(StreamEvent::Error(e.to_string()));
                    if attempt + 1 >= self.config.max_reconnect_attempts {
                        *self.state.write().await = StreamState::Disconnected;
                        let _ = self.events.send(StreamEvent::ConnectionExhausted);
                        warn!("reconnection budget spent; stream stays disconnected until an explicit connect");
                        return;
                    }
                    let delay = self
                        .config
                        .base_backoff_ms
                        .saturating_mul(1u64 << attempt.min(16))
                        .min(self.config.max_backoff_ms);
                    sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    /// Probe the data client for every subscribed pair, then start their
    /// tick generators.
    async fn establish(&self) -> Result<(), StreamError> {
        let pairs: Vec<String> = self.subscriptions.read().await.iter().cloned().collect();
        for pair_id in &pairs {
            self.client
                .get_price_snapshot(pair_id)
                .await
                .map_err(|e| StreamError::ConnectionFailed(format!("{}: {}", pair_id, e)))?;
        }
        for pair_id in pairs {
            self.spawn_ticker(pair_id).await;
        }
        Ok(())
    }

    async fn spawn_ticker(&self, pair_id: String) {
        let mut tickers = self.tickers.lock().await;
        if let Some(existing) = tickers.get(&pair_id) {
            if !existing.is_finished() {
                return;
            }
        }
        let client = self.client.clone();
        let events = self.events.clone();
        let monitors = self.monitors.clone();
        let config = self.config.clone();
        let id = pair_id.clone();
        let handle = tokio::spawn(async move {
            run_ticker(id, client, events, monitors, config).await;
        });
        tickers.insert(pair_id, handle);
    }
}

/// Per-pair tick generator: each interval, walk the last price by a uniform
/// ±0.5% step and emit the resulting tick, volume update, and any alerts.
async fn run_ticker(
    pair_id: String,
    client: Arc<MarketDataClient>,
    events: broadcast::Sender<StreamEvent>,
    monitors: Arc<RwLock<HashMap<String, VolatilityMonitor>>>,
    config: StreamConfig,
) {
    let mut last_price = match client.get_price_snapshot(&pair_id).await {
        Ok(snapshot) => snapshot.current_price,
        Err(e) => {
            warn!(pair_id, error = %e, "tick generator could not seed a price, stopping");
            let _ = events.send(StreamEvent::Error(format!("{}: {}", pair_id, e)));
            return;
        }
    };
    let mut volume_24h = match client.get_pool_snapshot(&pair_id).await {
        Ok(snapshot) => snapshot.volume_24h,
        Err(_) => 0.0,
    };

    let mut ticker = interval(Duration::from_secs(config.tick_interval_secs));
    // the first interval tick completes immediately; emission starts one
    // full interval after subscription
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let (price_step, volume_step) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(-0.005..=0.005f64),
                rng.gen_range(-0.01..=0.01f64),
            )
        };
        let price = last_price * (1.0 + price_step);
        let change_percent = calculate_percentage_change(last_price, price);
        let tick = PriceTick {
            pair_id: pair_id.clone(),
            price,
            change_percent,
            timestamp: Utc::now(),
        };
        let _ = events.send(StreamEvent::PriceUpdate(tick.clone()));

        volume_24h *= 1.0 + volume_step;
        let _ = events.send(StreamEvent::VolumeUpdate {
            pair_id: pair_id.clone(),
            volume_24h,
            timestamp: Utc::now(),
        });

        if change_percent.abs() > config.price_alert_threshold {
            let severity = if change_percent.abs() > config.price_alert_high_threshold {
                AlertSeverity::High
            } else {
                AlertSeverity::Medium
            };
            let _ = events.send(StreamEvent::PriceAlert {
                tick: tick.clone(),
                severity,
            });
        }

        if let Some(monitor) = monitors.write().await.get_mut(&pair_id) {
            if let Some(volatility) = monitor.record(change_percent) {
                let _ = events.send(StreamEvent::VolatilityAlert {
                    pair_id: pair_id.clone(),
                    volatility,
                    threshold: monitor.threshold(),
                    timestamp: Utc::now(),
                });
            }
        }

        last_price = price;
    }
}
