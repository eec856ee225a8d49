use serde::{Deserialize, Serialize};
use std::fmt;

const BPS: f64 = 1e4;

/// Inputs to the premium waterfall. Rates are in basis points unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterfallInputs {
    pub notional: f64,
    pub client_fee_bps: f64,
    pub opex_bps: f64,
    pub reserve_bps: f64,
    pub expected_loss: f64,
    pub mezz_notional: f64,
    /// Annual coupon as a fraction.
    pub mezz_coupon_rate: f64,
    pub senior_limit: f64,
    pub senior_fee_bps: f64,
    pub equity_capital: f64,
    pub senior_capital_factor: f64,
}

/// Allocation of one year's premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterfallResult {
    pub premium: f64,
    pub opex: f64,
    pub reserve: f64,
    pub expected_loss: f64,
    pub net_available: f64,
    pub mezz_coupon: f64,
    pub senior_fee: f64,
    pub equity_residual: f64,
    pub equity_roe: f64,
    pub mezz_icr: f64,
    pub implied_senior_roe: f64,
}

/// `num / den`, or zero when the denominator is not positive.
fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Run the premium through opex, reserve, expected loss, mezzanine coupon
/// and senior fee; the remainder accrues to equity.
///
/// # Examples
///
/// ```
/// use mtm_guarantee::capital::waterfall::{waterfall, WaterfallInputs};
///
/// let wf = waterfall(&WaterfallInputs {
///     notional: 100.0,
///     client_fee_bps: 100.0,
///     opex_bps: 10.0,
///     reserve_bps: 5.0,
///     expected_loss: 1.0,
///     mezz_notional: 10.0,
///     mezz_coupon_rate: 0.1,
///     senior_limit: 20.0,
///     senior_fee_bps: 50.0,
///     equity_capital: 10.0,
///     senior_capital_factor: 0.2,
/// });
/// let identity = wf.net_available - wf.mezz_coupon - wf.senior_fee;
/// assert!((wf.equity_residual - identity).abs() < 1e-12);
/// ```
pub fn waterfall(inputs: &WaterfallInputs) -> WaterfallResult {
    let premium = inputs.notional * inputs.client_fee_bps / BPS;
    let opex = inputs.notional * inputs.opex_bps / BPS;
    let reserve = inputs.notional * inputs.reserve_bps / BPS;
    let net_available = premium - opex - reserve - inputs.expected_loss;
    let mezz_coupon = inputs.mezz_notional * inputs.mezz_coupon_rate;
    let senior_fee = inputs.senior_limit * inputs.senior_fee_bps / BPS;
    let equity_residual = net_available - mezz_coupon - senior_fee;

    WaterfallResult {
        premium,
        opex,
        reserve,
        expected_loss: inputs.expected_loss,
        net_available,
        mezz_coupon,
        senior_fee,
        equity_residual,
        equity_roe: ratio(equity_residual, inputs.equity_capital),
        mezz_icr: ratio(net_available, mezz_coupon),
        implied_senior_roe: ratio(
            senior_fee,
            inputs.senior_limit * inputs.senior_capital_factor,
        ),
    }
}

impl fmt::Display for WaterfallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Premium Waterfall ===")?;
        writeln!(f, "Premium:            {:>18.0}", self.premium)?;
        writeln!(f, "  - Opex:           {:>18.0}", self.opex)?;
        writeln!(f, "  - Reserve:        {:>18.0}", self.reserve)?;
        writeln!(f, "  - Expected Loss:  {:>18.0}", self.expected_loss)?;
        writeln!(f, "Net Available:      {:>18.0}", self.net_available)?;
        writeln!(f, "  - Mezz Coupon:    {:>18.0}", self.mezz_coupon)?;
        writeln!(f, "  - Senior Fee:     {:>18.0}", self.senior_fee)?;
        writeln!(f, "Equity Residual:    {:>18.0}", self.equity_residual)?;
        writeln!(f, "Equity ROE:         {:>17.2}%", self.equity_roe * 100.0)?;
        writeln!(f, "Mezz ICR:           {:>17.2}x", self.mezz_icr)?;
        writeln!(f, "Senior Implied ROE: {:>17.2}%", self.implied_senior_roe * 100.0)
    }
}
