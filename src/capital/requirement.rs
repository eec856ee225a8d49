use crate::capital::loss_dist::LossStatistics;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Risk measure that sizes capital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapitalMethod {
    #[serde(rename = "var", alias = "VaR", alias = "VAR")]
    Var,
    #[default]
    #[serde(rename = "es", alias = "ES")]
    Es,
}

impl fmt::Display for CapitalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapitalMethod::Var => write!(f, "VaR"),
            CapitalMethod::Es => write!(f, "ES"),
        }
    }
}

/// `(ES or VaR) * (1 + overlay_pct)`.
///
/// # Examples
///
/// ```
/// use mtm_guarantee::capital::requirement::{required_capital, CapitalMethod};
///
/// assert_eq!(required_capital(100.0, 150.0, CapitalMethod::Es, 0.2), 180.0);
/// assert_eq!(required_capital(100.0, 150.0, CapitalMethod::Var, 0.2), 120.0);
/// ```
pub fn required_capital(var: f64, es: f64, method: CapitalMethod, overlay_pct: f64) -> f64 {
    let base = match method {
        CapitalMethod::Es => es,
        CapitalMethod::Var => var,
    };
    base * (1.0 + overlay_pct)
}

/// Notional per unit of capital; infinite when no capital is required.
pub fn max_leverage(notional: f64, capital: f64) -> f64 {
    if capital > 0.0 {
        notional / capital
    } else {
        f64::INFINITY
    }
}

/// Capital sizing for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapitalResult {
    pub method: CapitalMethod,
    pub overlay_pct: f64,
    pub required_capital: f64,
    /// `null` in JSON when infinite.
    #[serde(deserialize_with = "leverage_or_unbounded")]
    pub max_leverage: f64,
}

/// serde_json writes non-finite floats as `null`; read that back as unbounded.
fn leverage_or_unbounded<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

impl CapitalResult {
    pub fn from_statistics(
        stats: &LossStatistics,
        method: CapitalMethod,
        overlay_pct: f64,
        notional: f64,
    ) -> Self {
        let capital = required_capital(stats.var, stats.es, method, overlay_pct);
        let leverage = max_leverage(notional, capital);
        if leverage.is_infinite() {
            log::warn!("required capital is zero; leverage is unbounded");
        }
        Self {
            method,
            overlay_pct,
            required_capital: capital,
            max_leverage: leverage,
        }
    }
}

impl fmt::Display for CapitalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Capital ({} + {:.0}% overlay) ===", self.method, self.overlay_pct * 100.0)?;
        writeln!(f, "Required Capital:   {:>18.0}", self.required_capital)?;
        writeln!(f, "Max Leverage:       {:>17.2}x", self.max_leverage)
    }
}
