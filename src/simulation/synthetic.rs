//! Synthetic market data for trying the engine without a data feed.
//!
//! Quotes come out in local-per-USD terms with a depreciation drift and a
//! shared regional factor, so every currency is flagged as inverted.

use crate::core::currency::{default_currencies, CurrencyCode, QuoteConvention, QuoteConventions};
use crate::core::market::{FxQuote, MarketData, RateTable};
use chrono::{Months, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Configuration for generating a synthetic market.
#[derive(Debug, Clone)]
pub struct SyntheticMarketConfig {
    /// Number of monthly observations.
    pub months: usize,
    /// Currencies to quote.
    pub currencies: Vec<CurrencyCode>,
    /// Loading on the shared regional factor.
    pub common_factor: f64,
    /// Share of rate observations left missing.
    pub rate_gap_share: f64,
    pub seed: u64,
}

impl Default for SyntheticMarketConfig {
    fn default() -> Self {
        Self {
            months: 120,
            currencies: default_currencies(),
            common_factor: 0.4,
            rate_gap_share: 0.05,
            seed: 1,
        }
    }
}

/// Generate monthly quotes and a rate table.
pub fn generate_market(config: &SyntheticMarketConfig) -> MarketData {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let start = NaiveDate::from_ymd_opt(2015, 1, 31).unwrap_or_default();
    let dates: Vec<NaiveDate> = (0..config.months)
        .filter_map(|i| start.checked_add_months(Months::new(i as u32)))
        .collect();

    struct Profile {
        level: f64,
        vol: f64,
        drift: f64,
        rate: f64,
    }
    let mut profiles: Vec<Profile> = config
        .currencies
        .iter()
        .map(|_| Profile {
            level: 10f64.powf(rng.gen_range(0.0..4.5)),
            vol: rng.gen_range(0.01..0.04),
            drift: rng.gen_range(0.0..0.006),
            rate: rng.gen_range(6.0..16.0),
        })
        .collect();

    let loading = config.common_factor.clamp(0.0, 1.0);
    let idio = (1.0 - loading * loading).sqrt();

    let mut quotes = Vec::with_capacity(dates.len() * config.currencies.len());
    let mut local_rates: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(dates.len()); config.currencies.len()];
    let mut usd_rates = Vec::with_capacity(dates.len());
    let mut usd_rate: f64 = 2.5;

    for date in &dates {
        let common: f64 = rng.sample(StandardNormal);
        usd_rate = (usd_rate + 0.1 * rng.sample::<f64, _>(StandardNormal)).clamp(0.0, 6.0);
        usd_rates.push(Some(usd_rate));

        for (j, (currency, p)) in config.currencies.iter().zip(profiles.iter_mut()).enumerate() {
            let own: f64 = rng.sample(StandardNormal);
            p.level *= (p.drift + p.vol * (loading * common + idio * own)).exp();
            quotes.push(FxQuote::new(*date, currency.clone(), p.level));

            p.rate = (p.rate + 0.2 * rng.sample::<f64, _>(StandardNormal)).max(0.5);
            let gap = rng.gen::<f64>() < config.rate_gap_share;
            local_rates[j].push((!gap).then_some(p.rate));
        }
    }

    let mut conventions = QuoteConventions::new();
    let mut rates = RateTable::new(dates).with_column(CurrencyCode::usd(), usd_rates);
    for (currency, column) in config.currencies.iter().zip(local_rates) {
        conventions.set(currency.clone(), QuoteConvention::Inverted);
        rates = rates.with_column(currency.clone(), column);
    }

    log::debug!(
        "generated {} quotes over {} currencies",
        quotes.len(),
        config.currencies.len()
    );

    MarketData {
        quotes,
        conventions,
        rates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_market_shape() {
        let config = SyntheticMarketConfig {
            months: 24,
            ..Default::default()
        };
        let market = generate_market(&config);
        assert_eq!(market.quotes.len(), 24 * config.currencies.len());
        assert!(market.rates.validate().is_ok());
        assert!(market.missing_currencies(&config.currencies).is_empty());
    }

    #[test]
    fn test_generate_market_deterministic() {
        let config = SyntheticMarketConfig::default();
        let a = generate_market(&config);
        let b = generate_market(&config);
        assert_eq!(a.quotes, b.quotes);
    }

    #[test]
    fn test_quotes_positive_and_inverted() {
        let market = generate_market(&SyntheticMarketConfig::default());
        assert!(market.quotes.iter().all(|q| q.fx > 0.0));
        let kes = CurrencyCode::new("KES");
        assert_eq!(market.conventions.get(&kes), QuoteConvention::Inverted);
    }
}
