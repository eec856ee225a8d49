use crate::core::currency::CurrencyCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Portfolio allocation across currencies.
///
/// Weights are always normalized: non-negative and summing to one.
/// A currency without an entry has weight zero.
///
/// # Examples
///
/// ```
/// use mtm_guarantee::core::currency::CurrencyCode;
/// use mtm_guarantee::core::portfolio::PortfolioWeights;
///
/// let weights = PortfolioWeights::normalized([
///     (CurrencyCode::new("KES"), 3.0),
///     (CurrencyCode::new("UGX"), 1.0),
/// ]);
/// assert_eq!(weights.weight(&CurrencyCode::new("KES")), 0.75);
/// assert_eq!(weights.weight(&CurrencyCode::new("VND")), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortfolioWeights {
    weights: HashMap<CurrencyCode, f64>,
}

impl PortfolioWeights {
    /// Normalize raw weights.
    ///
    /// Negative entries are floored at zero before dividing by the total.
    /// If nothing positive remains, every listed currency gets an equal share.
    pub fn normalized(raw: impl IntoIterator<Item = (CurrencyCode, f64)>) -> Self {
        let raw: Vec<(CurrencyCode, f64)> = raw.into_iter().collect();
        let total: f64 = raw.iter().map(|(_, w)| w.max(0.0)).sum();
        let weights = if total > 0.0 {
            raw.into_iter().map(|(c, w)| (c, w.max(0.0) / total)).collect()
        } else {
            let n = raw.len() as f64;
            raw.into_iter().map(|(c, _)| (c, 1.0 / n)).collect()
        };
        Self { weights }
    }

    /// Equal weight on each currency.
    pub fn equal(currencies: &[CurrencyCode]) -> Self {
        Self::normalized(currencies.iter().map(|c| (c.clone(), 1.0)))
    }

    pub fn weight(&self, currency: &CurrencyCode) -> f64 {
        self.weights.get(currency).copied().unwrap_or(0.0)
    }

    /// Weights aligned with `currencies`; unlisted currencies get zero.
    pub fn aligned(&self, currencies: &[CurrencyCode]) -> Vec<f64> {
        currencies.iter().map(|c| self.weight(c)).collect()
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(code: &str) -> CurrencyCode {
        CurrencyCode::new(code)
    }

    #[test]
    fn test_negative_weights_floored() {
        let w = PortfolioWeights::normalized([(c("KES"), -1.0), (c("UGX"), 2.0)]);
        assert_eq!(w.weight(&c("KES")), 0.0);
        assert_eq!(w.weight(&c("UGX")), 1.0);
    }

    #[test]
    fn test_all_zero_falls_back_to_equal() {
        let w = PortfolioWeights::normalized([(c("KES"), 0.0), (c("UGX"), -3.0)]);
        assert_eq!(w.weight(&c("KES")), 0.5);
        assert_eq!(w.weight(&c("UGX")), 0.5);
    }

    #[test]
    fn test_equal_weights_sum_to_one() {
        let ccys = crate::core::currency::default_currencies();
        let w = PortfolioWeights::equal(&ccys);
        assert_relative_eq!(w.total(), 1.0, epsilon = 1e-12);
        assert_eq!(w.len(), 8);
    }

    #[test]
    fn test_aligned_zero_for_unlisted() {
        let w = PortfolioWeights::equal(&[c("KES"), c("UGX")]);
        assert_eq!(w.aligned(&[c("UGX"), c("VND")]), vec![0.5, 0.0]);
    }
}
