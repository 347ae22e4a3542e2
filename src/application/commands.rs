//! CLI commands and handlers

use crate::application::services::PortfolioService;
use crate::shared::config::AppConfig;
use crate::shared::errors::AppError;
use crate::shared::types::RiskTolerance;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "poolfolio")]
#[command(version, about = "Liquidity pool portfolio allocator with live price monitoring")]
pub struct Cli {
    /// Path to config file (optional)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the supported liquidity pairs
    Pairs {
        /// Show addresses, tokens and default weights
        #[arg(short, long)]
        detailed: bool,
    },

    /// Compute a portfolio allocation over selected pairs
    Allocate {
        /// Total investment in USD
        #[arg(short, long)]
        amount: f64,

        /// Pairs to allocate across (comma-separated ids); defaults to all
        #[arg(short, long)]
        pairs: Option<String>,

        /// Risk tolerance (low, medium, high)
        #[arg(short, long, default_value = "medium")]
        risk: String,
    },

    /// Stream live prices and alerts for selected pairs
    Monitor {
        /// Pairs to watch (comma-separated ids); defaults to all
        #[arg(short, long)]
        pairs: Option<String>,

        /// Stop after this many seconds (runs forever when omitted)
        #[arg(short, long)]
        duration: Option<u64>,

        /// Volatility alert threshold in percent
        #[arg(short, long, default_value_t = 3.0)]
        volatility: f64,

        /// Also allocate this amount up front and fold large price moves
        /// into the computed portfolio
        #[arg(short, long)]
        amount: Option<f64>,

        /// Risk tolerance for the upfront allocation (low, medium, high)
        #[arg(short, long, default_value = "medium")]
        risk: String,
    },

    /// Estimate divergence loss for a price ratio move
    SimulateLoss {
        /// Price ratio at position open
        #[arg(long, default_value_t = 1.0)]
        initial: f64,

        /// Current price ratio
        #[arg(long)]
        current: f64,
    },
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: AppConfig) -> Result<(), AppError> {
        let service = PortfolioService::new(config);
        match command {
            Commands::Pairs { detailed } => {
                service.list_pairs(detailed);
                Ok(())
            }
            Commands::Allocate {
                amount,
                pairs,
                risk,
            } => {
                let tolerance: RiskTolerance =
                    risk.parse().map_err(AppError::ConfigError)?;
                let pair_ids = split_pairs(pairs.as_deref());
                let refs: Vec<&str> = pair_ids.iter().map(String::as_str).collect();
                service.allocate(amount, &refs, tolerance).await?;
                Ok(())
            }
            Commands::Monitor {
                pairs,
                duration,
                volatility,
                amount,
                risk,
            } => {
                let pair_ids = split_pairs(pairs.as_deref());
                let refs: Vec<&str> = pair_ids.iter().map(String::as_str).collect();
                let portfolio = match amount {
                    Some(amount) => {
                        let tolerance: RiskTolerance =
                            risk.parse().map_err(AppError::ConfigError)?;
                        Some(service.allocate(amount, &refs, tolerance).await?)
                    }
                    None => None,
                };
                service.monitor(&refs, duration, volatility, portfolio).await
            }
            Commands::SimulateLoss { initial, current } => {
                service.simulate_loss(initial, current)?;
                Ok(())
            }
        }
    }
}

/// Comma-separated pair list, or the whole builtin catalog when omitted.
fn split_pairs(pairs: Option<&str>) -> Vec<String> {
    match pairs {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => crate::domain::registry::PoolRegistry::builtin()
            .all()
            .iter()
            .map(|p| p.id.clone())
            .collect(),
    }
}
