use crate::capital::StatsError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of loss levels on the exceedance curve.
pub const DEFAULT_EXCEEDANCE_POINTS: usize = 100;

/// Summary of a simulated loss distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossStatistics {
    pub confidence: f64,
    /// Mean loss.
    pub expected_loss: f64,
    /// Loss quantile at `confidence`.
    pub var: f64,
    /// Mean of losses at or above `var`.
    pub es: f64,
}

impl fmt::Display for LossStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Loss Distribution ({:.2}%) ===", self.confidence * 100.0)?;
        writeln!(f, "Expected Loss:      {:>18.0}", self.expected_loss)?;
        writeln!(f, "Value-at-Risk:      {:>18.0}", self.var)?;
        writeln!(f, "Expected Shortfall: {:>18.0}", self.es)
    }
}

/// Empirical quantile of an ascending-sorted sample.
///
/// Linear interpolation between order statistics at `h = (n - 1) * q`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = h - lo as f64;
    if frac == 0.0 {
        sorted[lo]
    } else {
        sorted[lo] + frac * (sorted[hi] - sorted[lo])
    }
}

/// Empirical quantile of an unsorted sample.
pub fn quantile(values: &[f64], q: f64) -> Result<f64, StatsError> {
    check_sample(values, q)?;
    Ok(quantile_sorted(&sorted(values), q))
}

/// Expected loss, VaR and ES at `confidence`.
///
/// ES falls back to VaR when no observation reaches VaR.
///
/// # Examples
///
/// ```
/// use mtm_guarantee::capital::loss_dist::var_es;
///
/// let stats = var_es(&[5.0; 10], 0.995).unwrap();
/// assert_eq!((stats.expected_loss, stats.var, stats.es), (5.0, 5.0, 5.0));
/// ```
pub fn var_es(losses: &[f64], confidence: f64) -> Result<LossStatistics, StatsError> {
    check_sample(losses, confidence)?;
    let expected_loss = mean(losses);
    let var = quantile_sorted(&sorted(losses), confidence);
    let (tail_sum, tail_count) = losses
        .iter()
        .filter(|&&l| l >= var)
        .fold((0.0, 0usize), |(s, n), &l| (s + l, n + 1));
    let es = if tail_count == 0 {
        log::warn!("empty loss tail at {confidence}, using VaR as ES");
        var
    } else {
        tail_sum / tail_count as f64
    };
    Ok(LossStatistics {
        confidence,
        expected_loss,
        var,
        es,
    })
}

/// Survival curve `P(loss > x)` sampled on evenly spaced loss levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceedanceCurve {
    pub levels: Vec<f64>,
    pub probabilities: Vec<f64>,
}

impl ExceedanceCurve {
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.levels.iter().copied().zip(self.probabilities.iter().copied())
    }
}

/// `P(loss > x)` at `points` levels from 0 to the sample maximum.
pub fn exceedance_curve(losses: &[f64], points: usize) -> Result<ExceedanceCurve, StatsError> {
    if losses.is_empty() {
        return Err(StatsError::EmptySample);
    }
    let max = losses.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let levels = linspace(0.0, max, points);
    let n = losses.len() as f64;
    let probabilities = levels
        .iter()
        .map(|&x| losses.iter().filter(|&&l| l > x).count() as f64 / n)
        .collect();
    Ok(ExceedanceCurve {
        levels,
        probabilities,
    })
}

/// `points` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (points - 1) as f64;
            (0..points)
                .map(|i| if i == points - 1 { stop } else { start + i as f64 * step })
                .collect()
        }
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

fn check_sample(values: &[f64], q: f64) -> Result<(), StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptySample);
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(StatsError::InvalidConfidence(q));
    }
    Ok(())
}
