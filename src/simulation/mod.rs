//! Scenario generation: FX paths, default times and their dependence,
//! plus synthetic market data.

pub mod correlation;
pub mod default_time;
pub mod dependence;
pub mod paths;
pub mod synthetic;

use crate::core::market::MarketDataError;
use thiserror::Error;

/// Errors raised while generating scenarios.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid simulation input: {0}")]
    InvalidInput(String),
    #[error("covariance matrix ({dimension}x{dimension}) is not positive definite")]
    DegenerateCovariance { dimension: usize },
    #[error(transparent)]
    MarketData(#[from] MarketDataError),
}
