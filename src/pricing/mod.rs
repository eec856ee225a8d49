//! MTM proxy valuation of the hedged FX book.

pub mod engine;
pub mod mtm_proxy;

use thiserror::Error;

/// Errors raised when pricing inputs do not line up.
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("{what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("spot vector and path tensor cover different currencies")]
    CurrencyMismatch,
}
