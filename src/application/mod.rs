//! Application layer - CLI commands and service wiring

pub mod commands;
pub mod services;

pub use commands::{Cli, CommandExecutor, Commands};
pub use services::PortfolioService;
