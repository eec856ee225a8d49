//! Closed-form return sensitivities around a simulated run.

use crate::capital::loss_dist::linspace;
use serde::{Deserialize, Serialize};

/// Fraction of PD-weighted vol stress that turns into annual loss rate.
const LOSS_SEVERITY: f64 = 0.2;

/// Equity ROE `L * (margin - loss_rate)` on a leverage grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageRoeCurve {
    pub leverage: Vec<f64>,
    pub roe: Vec<f64>,
    pub target_leverage: f64,
}

/// ROE on `points` leverage levels between `min` and `max`.
pub fn leverage_roe_curve(
    min: f64,
    max: f64,
    points: usize,
    base_margin: f64,
    loss_rate: f64,
    target_leverage: f64,
) -> LeverageRoeCurve {
    let leverage = linspace(min, max, points);
    let roe = leverage.iter().map(|l| l * (base_margin - loss_rate)).collect();
    LeverageRoeCurve {
        leverage,
        roe,
        target_leverage,
    }
}

/// Equity ROE proxy over a (PD x vol multiplier) grid at fixed leverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoeHeatmap {
    pub pds: Vec<f64>,
    pub vol_multipliers: Vec<f64>,
    /// `roe[i][j]` is for `pds[i]` and `vol_multipliers[j]`.
    pub roe: Vec<Vec<f64>>,
}

/// `leverage * (margin - pd * vol * 0.2)` for every grid cell.
pub fn pd_vol_heatmap(pds: Vec<f64>, vol_multipliers: Vec<f64>, base_margin: f64, leverage: f64) -> RoeHeatmap {
    let roe = pds
        .iter()
        .map(|p| {
            vol_multipliers
                .iter()
                .map(|v| leverage * (base_margin - p * v * LOSS_SEVERITY))
                .collect()
        })
        .collect();
    RoeHeatmap {
        pds,
        vol_multipliers,
        roe,
    }
}

/// Both sensitivity views for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensitivities {
    pub leverage_curve: LeverageRoeCurve,
    pub pd_vol: RoeHeatmap,
}

impl Sensitivities {
    /// Standard grids: leverage 5x..20x (40 points), PD 1%..10% and vol
    /// multiplier 0.8..1.4 (8 points each).
    pub fn standard(base_margin: f64, loss_rate: f64, target_leverage: f64) -> Self {
        Self {
            leverage_curve: leverage_roe_curve(5.0, 20.0, 40, base_margin, loss_rate, target_leverage),
            pd_vol: pd_vol_heatmap(
                linspace(0.01, 0.1, 8),
                linspace(0.8, 1.4, 8),
                base_margin,
                target_leverage,
            ),
        }
    }
}
