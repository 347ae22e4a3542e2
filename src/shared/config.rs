//! Configuration loading from Config.toml with sane defaults

use crate::shared::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Cache freshness windows in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub pool_ttl_secs: u64,
    pub price_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            pool_ttl_secs: 30,
            price_ttl_secs: 5,
        }
    }
}

/// Live price stream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    pub tick_interval_secs: u64,
    pub max_reconnect_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Sliding window size for the volatility monitor
    pub volatility_window: usize,
    /// Minimum samples before volatility is evaluated
    pub volatility_min_samples: usize,
    /// Single-tick change magnitude (percent) that raises a price alert
    pub price_alert_threshold: f64,
    /// Magnitude above which a price alert is high severity
    pub price_alert_high_threshold: f64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 5,
            max_reconnect_attempts: 5,
            base_backoff_ms: 1000,
            max_backoff_ms: 30_000,
            volatility_window: 20,
            volatility_min_samples: 5,
            price_alert_threshold: 5.0,
            price_alert_high_threshold: 10.0,
        }
    }
}

/// Allocation policy knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Weight boost applied to the hedge pair during volatile markets
    pub hedge_boost: f64,
    /// Hedge pair weight ceiling after the boost
    pub hedge_cap: f64,
    /// Per-pair weight floor when redistributing the boost
    pub weight_floor: f64,
    /// Average absolute 24h change (percent) that triggers the hedge boost
    pub hedge_trigger_pct: f64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            hedge_boost: 0.10,
            hedge_cap: 0.40,
            weight_floor: 0.05,
            hedge_trigger_pct: 5.0,
        }
    }
}

/// Market data backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of a pool-metrics JSON API; the simulated feed is used
    /// when unset
    pub api_base_url: Option<String>,
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from an explicit path, or from Config.toml when
    /// present, falling back to defaults otherwise.
    pub fn load(path: Option<&str>) -> Result<AppConfig, AppError> {
        match path {
            Some(p) => Self::load_file(p),
            None => {
                if Path::new("Config.toml").exists() {
                    Self::load_file("Config.toml")
                } else {
                    Ok(AppConfig::default())
                }
            }
        }
    }

    fn load_file(path: &str) -> Result<AppConfig, AppError> {
        let config_content = fs::read_to_string(path)
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: AppConfig = toml::from_str(&config_content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }
}
