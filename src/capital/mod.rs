//! Loss aggregation and everything sized from it: capital, investor
//! waterfall, liquidity and return sensitivities.

pub mod liquidity;
pub mod loss_dist;
pub mod requirement;
pub mod sensitivity;
pub mod stack;
pub mod waterfall;

use thiserror::Error;

/// Errors from sample statistics.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("loss sample is empty")]
    EmptySample,
    #[error("confidence must lie in [0, 1], got {0}")]
    InvalidConfidence(f64),
}
