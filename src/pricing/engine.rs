use crate::core::currency::CurrencyCode;
use crate::core::market::SpotVector;
use crate::pricing::mtm_proxy::{blend_ccs_ndf, mtm_phase0, mtm_phase1, MtmModel, NDF_CARRY_SCALE};
use crate::pricing::PricingError;
use crate::simulation::default_time::DefaultTimeVector;
use crate::simulation::paths::PathTensor;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Simulated month read for a default (or horizon) time.
///
/// `trunc(min(t * 12, months - 1))`: times that land on or past the last
/// simulated month read the last month.
#[inline]
pub fn resolve_month_index(t_years: f64, months: usize) -> usize {
    let last = months.saturating_sub(1) as f64;
    (t_years * 12.0).min(last).max(0.0) as usize
}

/// Per-path MTM exposure, by currency and in total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MtmResult {
    currencies: Vec<CurrencyCode>,
    /// rows = paths, columns = currencies
    contributions: DMatrix<f64>,
    weighted: Vec<f64>,
}

impl MtmResult {
    pub fn currencies(&self) -> &[CurrencyCode] {
        &self.currencies
    }

    /// (path x currency) MTM matrix.
    pub fn contributions(&self) -> &DMatrix<f64> {
        &self.contributions
    }

    /// Total MTM per path across currencies.
    pub fn weighted(&self) -> &[f64] {
        &self.weighted
    }

    /// MTM vector for one currency.
    pub fn currency_mtm(&self, currency: &CurrencyCode) -> Option<Vec<f64>> {
        let j = self.currencies.iter().position(|c| c == currency)?;
        Some(self.contributions.column(j).iter().copied().collect())
    }

    /// Mean contribution of each currency over the paths selected by `mask`.
    ///
    /// Zero for every currency when the mask selects nothing.
    pub fn mean_over(&self, mask: &[bool]) -> Vec<(CurrencyCode, f64)> {
        let selected: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then_some(i))
            .collect();
        self.currencies
            .iter()
            .enumerate()
            .map(|(j, c)| {
                let mean = if selected.is_empty() {
                    0.0
                } else {
                    selected.iter().map(|&i| self.contributions[(i, j)]).sum::<f64>()
                        / selected.len() as f64
                };
                (c.clone(), mean)
            })
            .collect()
    }
}

/// Values the hedge book on every simulated path.
///
/// Currency is a matrix dimension: each (path, currency) cell is priced
/// independently and the weighted MTM is the row sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MtmProxyEngine {
    pub model: MtmModel,
    /// Weight on the CCS-style proxy in the phase-1 blend.
    pub ccs_weight: f64,
    pub notional: f64,
    pub tenor_years: f64,
}

impl MtmProxyEngine {
    pub fn new(model: MtmModel, ccs_weight: f64, notional: f64, tenor_years: f64) -> Self {
        Self {
            model,
            ccs_weight,
            notional,
            tenor_years,
        }
    }

    /// Price every path.
    ///
    /// `weights` and `carries` are aligned with `paths.currencies()`;
    /// a zero weight removes the currency from the total.
    pub fn price(
        &self,
        paths: &PathTensor,
        spot: &SpotVector,
        default_times: &DefaultTimeVector,
        weights: &[f64],
        carries: &[f64],
    ) -> Result<MtmResult, PricingError> {
        let (n_paths, months, n_ccy) = paths.shape();
        if spot.currencies() != paths.currencies() {
            return Err(PricingError::CurrencyMismatch);
        }
        check_len("default times", n_paths, default_times.len())?;
        check_len("weights", n_ccy, weights.len())?;
        check_len("carries", n_ccy, carries.len())?;

        let s0 = spot.levels();
        let horizons: Vec<f64> = (0..n_paths)
            .map(|p| default_times.horizon(p, self.tenor_years))
            .collect();
        let month_idx: Vec<usize> = horizons
            .iter()
            .map(|&t| resolve_month_index(t, months))
            .collect();

        let contributions = DMatrix::from_fn(n_paths, n_ccy, |p, j| {
            let notional = self.notional * weights[j];
            let st = paths.spot(p, month_idx[p], j);
            match self.model {
                MtmModel::Phase0 => mtm_phase0(notional, s0[j], st),
                MtmModel::Phase1 => {
                    let t = horizons[p].clamp(0.0, self.tenor_years);
                    let ccs = mtm_phase1(notional, s0[j], st, carries[j], t);
                    let ndf = mtm_phase1(notional, s0[j], st, carries[j] * NDF_CARRY_SCALE, t);
                    blend_ccs_ndf(ccs, ndf, self.ccs_weight)
                }
            }
        });
        let weighted: Vec<f64> = contributions.column_sum().iter().copied().collect();

        log::debug!(
            "priced {:?} MTM on {} paths x {} currencies",
            self.model,
            n_paths,
            n_ccy
        );

        Ok(MtmResult {
            currencies: paths.currencies().to_vec(),
            contributions,
            weighted,
        })
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), PricingError> {
    if expected == actual {
        Ok(())
    } else {
        Err(PricingError::LengthMismatch {
            what,
            expected,
            actual,
        })
    }
}
