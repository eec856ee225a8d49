use crate::guarantee::contract::{GuaranteeContract, PayoutMode};
use crate::guarantee::GuaranteeError;

/// Loss before tranching for one path.
///
/// In `DefaultTriggered` mode the loss is zero unless `default_flag` is set.
#[inline]
pub fn raw_loss(mtm: f64, default_flag: f64, contract: &GuaranteeContract) -> f64 {
    let covered = mtm.max(0.0) * contract.coverage_pct();
    match contract.mode() {
        PayoutMode::DefaultTriggered => default_flag * covered,
        PayoutMode::FullMtm => covered,
    }
}

/// Apply attachment/detachment subordination and the absolute limit.
///
/// `min(clip(raw - A*N, 0, (D - A)*N), L*N)`.
#[inline]
pub fn apply_tranche(raw: f64, notional: f64, contract: &GuaranteeContract) -> f64 {
    let att = contract.attachment() * notional;
    let width = (contract.tranche_width() * notional).max(0.0);
    let limit = contract.limit_pct() * notional;
    (raw - att).clamp(0.0, width).min(limit)
}

/// Guarantee payout per path.
///
/// Every payout lies in `[0, limit_pct * notional]`.
///
/// # Examples
///
/// ```
/// use mtm_guarantee::guarantee::contract::{GuaranteeContract, PayoutMode};
/// use mtm_guarantee::guarantee::payout::payout_distribution;
///
/// let contract = GuaranteeContract::new(1.0, 0.0, 1.0, 1.0, PayoutMode::DefaultTriggered).unwrap();
/// let payouts = payout_distribution(&[10.0, -5.0, 8.0], &[1.0, 1.0, 0.0], 100.0, &contract).unwrap();
/// assert_eq!(payouts, vec![10.0, 0.0, 0.0]);
/// ```
pub fn payout_distribution(
    mtm: &[f64],
    default_flags: &[f64],
    notional: f64,
    contract: &GuaranteeContract,
) -> Result<Vec<f64>, GuaranteeError> {
    if mtm.len() != default_flags.len() {
        return Err(GuaranteeError::LengthMismatch {
            mtm: mtm.len(),
            flags: default_flags.len(),
        });
    }
    Ok(mtm
        .iter()
        .zip(default_flags)
        .map(|(&m, &flag)| apply_tranche(raw_loss(m, flag, contract), notional, contract))
        .collect())
}
