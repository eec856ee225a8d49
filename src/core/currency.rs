use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// ISO 4217-style currency code.
///
/// Emerging-market exposures are keyed by the local currency
/// (UGX, KES, VND, ...); `USD` is the reference leg.
///
/// # Examples
///
/// ```
/// use mtm_guarantee::core::currency::CurrencyCode;
///
/// let ugx = CurrencyCode::new("UGX");
/// let kes = CurrencyCode::new("KES");
/// assert_ne!(ugx, kes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The USD reference currency.
    pub fn usd() -> Self {
        Self::new("USD")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Currencies the guarantee book covers by default.
pub fn default_currencies() -> Vec<CurrencyCode> {
    ["UGX", "TZS", "KES", "BWP", "BDT", "LKR", "VND", "IDR"]
        .into_iter()
        .map(CurrencyCode::new)
        .collect()
}

/// How a raw FX quote is expressed relative to the normalized convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteConvention {
    /// Quote is already in the normalized direction.
    #[default]
    Direct,
    /// Quote must be inverted (`1 / fx`) before use.
    Inverted,
}

impl QuoteConvention {
    /// Bring a raw quote into the normalized direction.
    pub fn normalize(self, fx: f64) -> f64 {
        match self {
            QuoteConvention::Direct => fx,
            QuoteConvention::Inverted => 1.0 / fx,
        }
    }
}

/// Per-currency quote conventions. Currencies without an entry are `Direct`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteConventions {
    conventions: HashMap<CurrencyCode, QuoteConvention>,
}

impl QuoteConventions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a currency as quoted inverted.
    pub fn invert(mut self, currency: CurrencyCode) -> Self {
        self.conventions.insert(currency, QuoteConvention::Inverted);
        self
    }

    pub fn set(&mut self, currency: CurrencyCode, convention: QuoteConvention) {
        self.conventions.insert(currency, convention);
    }

    pub fn get(&self, currency: &CurrencyCode) -> QuoteConvention {
        self.conventions.get(currency).copied().unwrap_or_default()
    }

    /// Normalize a raw quote for `currency`.
    pub fn normalize(&self, currency: &CurrencyCode, fx: f64) -> f64 {
        self.get(currency).normalize(fx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_currency_code_equality() {
        let a = CurrencyCode::new("KES");
        let b = CurrencyCode::new("KES");
        assert_eq!(a, b);
    }

    #[test]
    fn test_default_currencies() {
        let ccys = default_currencies();
        assert_eq!(ccys.len(), 8);
        assert_eq!(ccys[0], CurrencyCode::new("UGX"));
    }

    #[test]
    fn test_quote_inversion() {
        let conventions = QuoteConventions::new().invert(CurrencyCode::new("UGX"));
        let norm = conventions.normalize(&CurrencyCode::new("UGX"), 3500.0);
        assert_relative_eq!(norm, 1.0 / 3500.0);
    }

    #[test]
    fn test_quote_inversion_round_trip() {
        let inv = QuoteConvention::Inverted;
        let x = 3712.25;
        assert_relative_eq!(inv.normalize(inv.normalize(x)), x, max_relative = 1e-15);
    }

    #[test]
    fn test_unlisted_currency_is_direct() {
        let conventions = QuoteConventions::new().invert(CurrencyCode::new("UGX"));
        assert_eq!(
            conventions.get(&CurrencyCode::new("KES")),
            QuoteConvention::Direct
        );
        assert_eq!(conventions.normalize(&CurrencyCode::new("KES"), 130.0), 130.0);
    }
}
