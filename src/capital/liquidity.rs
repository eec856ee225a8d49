use crate::capital::loss_dist::{mean, quantile_sorted};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Months summed into one block for the 3-month cash-call view.
const BLOCK_MONTHS: usize = 3;

/// Short-horizon cash-call analysis of guarantee claims.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityAnalysis {
    pub expected_monthly: f64,
    pub one_month_95: f64,
    pub one_month_99: f64,
    pub three_month_95: f64,
    pub three_month_99: f64,
    /// Floor applied to the recommendation, as an amount.
    pub floor: f64,
    /// `max(1m 99%, 3m 95%, floor)`.
    pub recommended: f64,
}

impl LiquidityAnalysis {
    /// Analyse a monthly claims series.
    ///
    /// Three-month figures use non-overlapping consecutive 3-month sums;
    /// a trailing partial block is left out. With fewer than three claims
    /// the monthly series stands in for the 3-month one.
    ///
    /// Returns `None` for an empty series.
    pub fn from_monthly_claims(claims: &[f64], floor_pct: f64, notional: f64) -> Option<Self> {
        if claims.is_empty() {
            return None;
        }
        let mut monthly = claims.to_vec();
        monthly.sort_by(f64::total_cmp);

        let mut blocks: Vec<f64> = if claims.len() >= BLOCK_MONTHS {
            claims
                .chunks_exact(BLOCK_MONTHS)
                .map(|c| c.iter().sum())
                .collect()
        } else {
            claims.to_vec()
        };
        blocks.sort_by(f64::total_cmp);

        let one_month_95 = quantile_sorted(&monthly, 0.95);
        let one_month_99 = quantile_sorted(&monthly, 0.99);
        let three_month_95 = quantile_sorted(&blocks, 0.95);
        let three_month_99 = quantile_sorted(&blocks, 0.99);
        let floor = floor_pct * notional;

        Some(LiquidityAnalysis {
            expected_monthly: mean(claims),
            one_month_95,
            one_month_99,
            three_month_95,
            three_month_99,
            floor,
            recommended: one_month_99.max(three_month_95).max(floor),
        })
    }

    /// Analyse per-path losses paid evenly over `months`.
    pub fn from_path_losses(losses: &[f64], months: usize, floor_pct: f64, notional: f64) -> Option<Self> {
        Self::from_monthly_claims(&spread_monthly(losses, months), floor_pct, notional)
    }
}

/// Spread each path's loss evenly over `months`, path by path.
pub fn spread_monthly(losses: &[f64], months: usize) -> Vec<f64> {
    let per = months.max(1) as f64;
    losses
        .iter()
        .flat_map(|&l| std::iter::repeat(l / per).take(months))
        .collect()
}

impl fmt::Display for LiquidityAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Liquidity Analysis ===")?;
        writeln!(f, "Expected Monthly:   {:>18.0}", self.expected_monthly)?;
        writeln!(f, "1M 95% / 99%:       {:>18.0} / {:.0}", self.one_month_95, self.one_month_99)?;
        writeln!(f, "3M 95% / 99%:       {:>18.0} / {:.0}", self.three_month_95, self.three_month_99)?;
        writeln!(f, "Floor:              {:>18.0}", self.floor)?;
        writeln!(f, "Recommended Buffer: {:>18.0}", self.recommended)
    }
}
