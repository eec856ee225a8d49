use serde::{Deserialize, Serialize};

/// Funding layers behind the guarantee, as amounts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapitalStack {
    pub equity: f64,
    pub mezz: f64,
    /// Whatever equity and mezzanine leave of the notional, never negative.
    pub senior: f64,
}

/// Split `notional` into equity, mezzanine and senior layers.
pub fn layer_amounts(notional: f64, equity_pct: f64, mezz_pct: f64) -> CapitalStack {
    let equity = notional * equity_pct;
    let mezz = notional * mezz_pct;
    CapitalStack {
        equity,
        mezz,
        senior: (notional - equity - mezz).max(0.0),
    }
}
