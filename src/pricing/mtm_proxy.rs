//! Heuristic MTM proxies for the lender's FX hedge.
//!
//! These are loss-equivalent payoffs, not priced derivatives. The FX leg is
//! one-sided: only local-currency depreciation (`St < S0` in normalized
//! quotes) creates exposure.

use serde::{Deserialize, Serialize};

/// Share of the carry drift that accrues to the phase-1 proxy.
pub const CARRY_SHARE: f64 = 0.5;
/// NDF-style proxies see half the carry of the CCS-style proxy.
pub const NDF_CARRY_SCALE: f64 = 0.5;

/// Which proxy values the exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MtmModel {
    /// Spot-only depreciation payoff.
    Phase0,
    /// Depreciation plus carry, blended between CCS and NDF styles.
    #[default]
    Phase1,
}

/// Depreciation leg `max(S0/St - 1, 0)`.
#[inline]
pub fn fx_leg(s0: f64, st: f64) -> f64 {
    (s0 / st - 1.0).max(0.0)
}

/// Phase-0: `notional * max(S0/St - 1, 0)`.
#[inline]
pub fn mtm_phase0(notional: f64, s0: f64, st: f64) -> f64 {
    notional * fx_leg(s0, st)
}

/// Phase-1: `notional * max(fx_leg + 0.5 * (exp(carry * t) - 1), 0)`.
///
/// `carry` is an annualized rate differential as a fraction, `t_years`
/// the elapsed time.
#[inline]
pub fn mtm_phase1(notional: f64, s0: f64, st: f64, carry: f64, t_years: f64) -> f64 {
    let carry_adj = (carry * t_years).exp() - 1.0;
    notional * (fx_leg(s0, st) + CARRY_SHARE * carry_adj).max(0.0)
}

/// `ccs_weight * ccs + (1 - ccs_weight) * ndf`.
#[inline]
pub fn blend_ccs_ndf(ccs_mtm: f64, ndf_mtm: f64, ccs_weight: f64) -> f64 {
    ccs_weight * ccs_mtm + (1.0 - ccs_weight) * ndf_mtm
}
