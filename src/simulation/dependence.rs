//! Wrong-way risk: obligor PD rising with adverse FX moves.

use crate::simulation::paths::PathTensor;

pub const MIN_ADJUSTED_PD: f64 = 1e-4;
pub const MAX_ADJUSTED_PD: f64 = 0.95;

/// Scale a base PD by `exp(dependence * fx_shock)`, clipped to
/// `[MIN_ADJUSTED_PD, MAX_ADJUSTED_PD]`.
///
/// Positive `dependence` is wrong-way: a depreciation shock (positive
/// `fx_shock`) raises the PD.
pub fn adjust_pd_for_fx(pd_base: f64, fx_shock: f64, dependence: f64) -> f64 {
    (pd_base * (dependence * fx_shock).exp()).clamp(MIN_ADJUSTED_PD, MAX_ADJUSTED_PD)
}

/// Weighted terminal depreciation per path: `sum_j w_j * ln(S0_j / S_T,j)`.
///
/// `weights` and `s0` are aligned with the tensor's currencies.
pub fn terminal_fx_shock(paths: &PathTensor, s0: &[f64], weights: &[f64]) -> Vec<f64> {
    let last = paths.months().saturating_sub(1);
    (0..paths.paths())
        .map(|p| {
            paths
                .step(p, last)
                .iter()
                .zip(s0)
                .zip(weights)
                .map(|((st, start), w)| w * (start / st).ln())
                .sum::<f64>()
        })
        .collect()
}
