//! Error handling for the application

use thiserror::Error;

/// Market data errors
#[derive(Error, Debug, Clone)]
pub enum MarketError {
    #[error("no data available for pair: {0}")]
    DataUnavailable(String),

    #[error("upstream data source error: {0}")]
    Upstream(String),

    #[error("price ratio must be positive, got {0}")]
    InvalidRatio(f64),
}

/// Price stream errors
#[derive(Error, Debug, Clone)]
pub enum StreamError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
}

/// Allocation errors
#[derive(Error, Debug, Clone)]
pub enum AllocationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no pool data available for any selected pair")]
    NoDataAvailable,
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Market data error: {0}")]
    Market(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Allocation error: {0}")]
    Allocation(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<MarketError> for AppError {
    fn from(err: MarketError) -> Self {
        AppError::Market(err.to_string())
    }
}

impl From<StreamError> for AppError {
    fn from(err: StreamError) -> Self {
        AppError::Stream(err.to_string())
    }
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        AppError::Allocation(err.to_string())
    }
}
