//! Application services and use cases

use crate::domain::allocation::{merge_tick, AllocationEngine};
use crate::domain::market::{MarketDataClient, MarketDataSource};
use crate::domain::registry::PoolRegistry;
use crate::domain::stream::{AlertSeverity, PriceStream, StreamEvent};
use crate::infrastructure::cache::MemoryCacheStore;
use crate::infrastructure::datasource::{HttpDataSource, SimulatedDataSource};
use crate::shared::config::AppConfig;
use crate::shared::errors::AppError;
use crate::shared::types::{PortfolioResult, RiskTolerance};
use crate::shared::utils::format_usd;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{Duration, Instant};
use tracing::{info, warn};

/// Composition root wiring the registry, cached market data client, price
/// stream and allocation engine together for the CLI.
pub struct PortfolioService {
    registry: Arc<PoolRegistry>,
    client: Arc<MarketDataClient>,
    stream: Arc<PriceStream>,
    engine: AllocationEngine,
}

impl PortfolioService {
    pub fn new(config: AppConfig) -> Self {
        let registry = Arc::new(PoolRegistry::builtin());
        let source: Arc<dyn MarketDataSource> = match config.source.api_base_url {
            Some(url) => {
                info!("using pool-metrics API at {}", url);
                Arc::new(HttpDataSource::new(url))
            }
            None => Arc::new(SimulatedDataSource::for_registry(&registry)),
        };
        let cache = Arc::new(MemoryCacheStore::new());
        let client = Arc::new(MarketDataClient::new(
            registry.clone(),
            source,
            cache,
            config.cache,
        ));
        let stream = Arc::new(PriceStream::new(client.clone(), config.stream));
        let engine = AllocationEngine::new(registry.clone(), client.clone(), config.allocation);
        Self {
            registry,
            client,
            stream,
            engine,
        }
    }

    /// Print the supported pair catalog.
    pub fn list_pairs(&self, detailed: bool) {
        info!("📋 Supported pairs: {}", self.registry.all().len());
        for pair in self.registry.all() {
            info!(
                "   {} ({}) - {} tier, {}",
                pair.id, pair.name, pair.risk_tier, pair.hedge_class
            );
            if detailed {
                info!("      address: {}", pair.address);
                info!("      tokens:  {} / {}", pair.token_a, pair.token_b);
                if let Some(weight) = pair.default_weight {
                    info!("      default weight: {:.0}%", weight * 100.0);
                }
            }
        }
        info!("🛡️ Designated hedge pair: {}", self.registry.hedge_pair().id);
    }

    /// Compute and print a portfolio allocation.
    pub async fn allocate(
        &self,
        amount: f64,
        pair_ids: &[&str],
        tolerance: RiskTolerance,
    ) -> Result<PortfolioResult, AppError> {
        info!(
            "🧮 Allocating {} across {} pairs ({} tolerance)",
            format_usd(amount),
            pair_ids.len(),
            tolerance
        );
        let result = self
            .engine
            .compute_allocation(amount, pair_ids, tolerance)
            .await?;

        info!("📊 Portfolio {}", result.id);
        for pool in &result.pools {
            info!(
                "   {} - {} ({:.2}%)",
                pool.name,
                format_usd(pool.amount),
                pool.allocation_percent
            );
            info!(
                "      price {:.4} ({:+.2}% 24h, {}), APY {:.2}%",
                pool.current_price, pool.price_change_24h, pool.trend, pool.apy
            );
            info!(
                "      range {:.4} .. {:.4} (est. yield {:.1}%), est. divergence loss {:.3}%",
                pool.optimal_range.lower,
                pool.optimal_range.upper,
                pool.optimal_range.expected_yield,
                pool.estimated_loss_pct
            );
        }
        info!(
            "💰 Expected daily yield: {} ({:.4}%)",
            format_usd(result.expected_daily_yield),
            result.expected_daily_yield_percent
        );
        info!(
            "   Risk tier: {}, hedge ratio: {:.0}%, correlation: {:.2}",
            result.risk_tier,
            result.hedge_ratio * 100.0,
            result.correlation_score
        );
        Ok(result)
    }

    /// Run the live price stream and print events until the duration
    /// elapses, or indefinitely when no duration is given. When a computed
    /// portfolio is supplied, price moves past the merge threshold are
    /// folded into it.
    pub async fn monitor(
        &self,
        pair_ids: &[&str],
        duration_secs: Option<u64>,
        volatility_threshold: f64,
        mut portfolio: Option<PortfolioResult>,
    ) -> Result<(), AppError> {
        info!("🚀 Starting price monitoring for {} pairs", pair_ids.len());
        let mut events = self.stream.events();
        for pair_id in pair_ids {
            self.stream
                .monitor_volatility(pair_id, volatility_threshold)
                .await;
        }
        self.stream.subscribe(pair_ids).await;

        let deadline = duration_secs.map(|secs| Instant::now() + Duration::from_secs(secs));
        loop {
            let event = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, events.recv()).await {
                    Ok(event) => event,
                    Err(_) => break,
                },
                None => events.recv().await,
            };
            match event {
                Ok(event) => {
                    if let (Some(result), StreamEvent::PriceUpdate(tick)) =
                        (portfolio.as_mut(), &event)
                    {
                        if merge_tick(result, tick) {
                            info!(
                                "🔁 Portfolio {}: {} repriced to {:.4}",
                                result.id, tick.pair_id, tick.price
                            );
                        }
                    }
                    report_event(&event);
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "monitor fell behind the event stream");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }

        self.stream.disconnect().await;
        info!("✅ Monitoring finished");
        Ok(())
    }

    /// Print the divergence-loss estimate for a price ratio move.
    pub fn simulate_loss(&self, initial_ratio: f64, current_ratio: f64) -> Result<(), AppError> {
        let loss = self
            .client
            .estimate_realized_loss(initial_ratio, current_ratio)?;
        info!(
            "📉 Price ratio {:.4} -> {:.4}: divergence loss {:.4}% vs holding",
            initial_ratio, current_ratio, loss
        );
        Ok(())
    }
}

fn report_event(event: &StreamEvent) {
    match event {
        StreamEvent::Connected => info!("🔌 Stream connected"),
        StreamEvent::Disconnected => info!("🔌 Stream disconnected"),
        StreamEvent::PriceUpdate(tick) => {
            info!(
                "   {} {:.4} ({:+.3}%)",
                tick.pair_id, tick.price, tick.change_percent
            );
        }
        StreamEvent::VolumeUpdate {
            pair_id, volume_24h, ..
        } => {
            info!("   {} 24h volume {}", pair_id, format_usd(*volume_24h));
        }
        StreamEvent::PriceAlert { tick, severity } => {
            let badge = match severity {
                AlertSeverity::High => "🚨",
                AlertSeverity::Medium => "⚠️",
            };
            info!(
                "{} Price alert: {} moved {:+.2}% to {:.4}",
                badge, tick.pair_id, tick.change_percent, tick.price
            );
        }
        StreamEvent::VolatilityAlert {
            pair_id,
            volatility,
            threshold,
            ..
        } => {
            info!(
                "🌊 Volatility alert: {} at {:.2}% (threshold {:.2}%)",
                pair_id, volatility, threshold
            );
        }
        StreamEvent::Error(message) => warn!("stream error: {}", message),
        StreamEvent::ConnectionExhausted => {
            warn!("reconnection attempts exhausted, stream stays down");
        }
    }
}
