//! Guarantee terms and the payout they imply on each path.

pub mod contract;
pub mod payout;

use thiserror::Error;

/// Errors in guarantee terms or payout inputs.
#[derive(Debug, Error)]
pub enum GuaranteeError {
    #[error("{field} must lie in [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("attachment {attachment} exceeds detachment {detachment}")]
    InvertedTranche { attachment: f64, detachment: f64 },
    #[error("{mtm} MTM values but {flags} default flags")]
    LengthMismatch { mtm: usize, flags: usize },
}
