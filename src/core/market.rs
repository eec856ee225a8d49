use crate::core::currency::{CurrencyCode, QuoteConventions};
use chrono::NaiveDate;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Number of trailing rate observations averaged into the carry differential.
pub const CARRY_LOOKBACK: usize = 12;

/// Errors arising from market data preparation.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("currency {0} has no return history")]
    UnknownCurrency(CurrencyCode),
    #[error("no spot quote for {currency} on the last observation date {date}")]
    MissingSpot { currency: CurrencyCode, date: NaiveDate },
    #[error("FX quote must be positive and finite, got {fx} for {currency} on {date}")]
    InvalidQuote {
        currency: CurrencyCode,
        date: NaiveDate,
        fx: f64,
    },
    #[error("no usable observations: {0}")]
    Empty(String),
    #[error("spot vector has {levels} levels for {currencies} currencies")]
    SpotLength { currencies: usize, levels: usize },
    #[error("rate column {column} has {actual} values but the table has {expected} dates")]
    RaggedRates {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// A single raw FX observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxQuote {
    pub date: NaiveDate,
    pub currency: CurrencyCode,
    pub fx: f64,
}

impl FxQuote {
    pub fn new(date: NaiveDate, currency: impl Into<CurrencyCode>, fx: f64) -> Self {
        Self {
            date,
            currency: currency.into(),
            fx,
        }
    }
}

/// Date-ordered monthly log-returns, one column per currency.
///
/// Rows are complete: a date appears only if every column has a return
/// for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    dates: Vec<NaiveDate>,
    currencies: Vec<CurrencyCode>,
    /// rows = dates, columns = currencies
    returns: DMatrix<f64>,
}

impl ReturnSeries {
    /// Build a return series from a (dates x currencies) matrix.
    pub fn new(
        dates: Vec<NaiveDate>,
        currencies: Vec<CurrencyCode>,
        returns: DMatrix<f64>,
    ) -> Result<Self, MarketDataError> {
        if returns.nrows() != dates.len() || returns.ncols() != currencies.len() {
            return Err(MarketDataError::Empty(format!(
                "return matrix is {}x{} but there are {} dates and {} currencies",
                returns.nrows(),
                returns.ncols(),
                dates.len(),
                currencies.len()
            )));
        }
        Ok(Self {
            dates,
            currencies,
            returns,
        })
    }

    /// Log-returns between consecutive normalized quotes.
    ///
    /// Quotes are normalized with `conventions`, pivoted by date and
    /// differenced. A return row is kept only when every currency in
    /// `currencies` is quoted on both dates.
    pub fn from_quotes(
        quotes: &[FxQuote],
        currencies: &[CurrencyCode],
        conventions: &QuoteConventions,
    ) -> Result<Self, MarketDataError> {
        let pivot = pivot_normalized(quotes, currencies, conventions)?;
        let levels: Vec<(&NaiveDate, &HashMap<&CurrencyCode, f64>)> = pivot.iter().collect();

        let mut dates = Vec::new();
        let mut rows: Vec<f64> = Vec::new();
        for pair in levels.windows(2) {
            let (_, prev) = pair[0];
            let (date, curr) = pair[1];
            let row: Option<Vec<f64>> = currencies
                .iter()
                .map(|c| match (prev.get(c), curr.get(c)) {
                    (Some(p), Some(q)) => Some((q / p).ln()),
                    _ => None,
                })
                .collect();
            if let Some(row) = row {
                dates.push(*date);
                rows.extend(row);
            }
        }

        let returns = DMatrix::from_row_slice(dates.len(), currencies.len(), &rows);
        log::debug!(
            "built return series: {} rows x {} currencies from {} quotes",
            dates.len(),
            currencies.len(),
            quotes.len()
        );
        Self::new(dates, currencies.to_vec(), returns)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn currencies(&self) -> &[CurrencyCode] {
        &self.currencies
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.returns
    }

    /// Column index of a currency.
    pub fn column_of(&self, currency: &CurrencyCode) -> Option<usize> {
        self.currencies.iter().position(|c| c == currency)
    }

    /// Extract the columns for `currencies`, in that order.
    ///
    /// Fails on the first currency with no return history.
    pub fn select(&self, currencies: &[CurrencyCode]) -> Result<DMatrix<f64>, MarketDataError> {
        let columns = currencies
            .iter()
            .map(|c| {
                self.column_of(c)
                    .ok_or_else(|| MarketDataError::UnknownCurrency(c.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.returns.select_columns(columns.iter()))
    }
}

/// Most recent normalized spot per currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotVector {
    currencies: Vec<CurrencyCode>,
    levels: Vec<f64>,
}

impl SpotVector {
    /// One level per currency, in the same order.
    pub fn new(currencies: Vec<CurrencyCode>, levels: Vec<f64>) -> Result<Self, MarketDataError> {
        if currencies.len() != levels.len() {
            return Err(MarketDataError::SpotLength {
                currencies: currencies.len(),
                levels: levels.len(),
            });
        }
        Ok(Self { currencies, levels })
    }

    /// Spot levels on the last quoted date.
    pub fn from_quotes(
        quotes: &[FxQuote],
        currencies: &[CurrencyCode],
        conventions: &QuoteConventions,
    ) -> Result<Self, MarketDataError> {
        let pivot = pivot_normalized(quotes, currencies, conventions)?;
        let (date, last) = pivot
            .iter()
            .next_back()
            .ok_or_else(|| MarketDataError::Empty("no FX quotes for the selection".into()))?;
        let levels = currencies
            .iter()
            .map(|c| {
                last.get(c).copied().ok_or_else(|| MarketDataError::MissingSpot {
                    currency: c.clone(),
                    date: *date,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(currencies.to_vec(), levels)
    }

    pub fn currencies(&self) -> &[CurrencyCode] {
        &self.currencies
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, currency: &CurrencyCode) -> Option<f64> {
        self.currencies
            .iter()
            .position(|c| c == currency)
            .map(|i| self.levels[i])
    }
}

/// Date-indexed interest rates in percent, one column per currency plus
/// a USD reference column. Missing observations are `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub dates: Vec<NaiveDate>,
    pub columns: HashMap<CurrencyCode, Vec<Option<f64>>>,
}

impl RateTable {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: HashMap::new(),
        }
    }

    pub fn with_column(mut self, currency: impl Into<CurrencyCode>, values: Vec<Option<f64>>) -> Self {
        self.columns.insert(currency.into(), values);
        self
    }

    /// Every column must have one entry per date.
    pub fn validate(&self) -> Result<(), MarketDataError> {
        for (column, values) in &self.columns {
            if values.len() != self.dates.len() {
                return Err(MarketDataError::RaggedRates {
                    column: column.to_string(),
                    expected: self.dates.len(),
                    actual: values.len(),
                });
            }
        }
        Ok(())
    }

    /// Rate columns a carry for `currencies` would need but the table lacks.
    ///
    /// `USD` comes first when absent, since without it every carry is 0.
    pub fn missing_columns(&self, currencies: &[CurrencyCode]) -> Vec<CurrencyCode> {
        let usd = CurrencyCode::usd();
        std::iter::once(&usd)
            .chain(currencies.iter().filter(|c| **c != usd))
            .filter(|c| !self.columns.contains_key(*c))
            .cloned()
            .collect()
    }

    /// Annualized local-vs-USD carry as a fraction.
    ///
    /// Mean of the last [`CARRY_LOOKBACK`] dates where both rates are
    /// observed, divided by 100. Zero when either column is missing or
    /// the two never overlap.
    pub fn differential(&self, currency: &CurrencyCode) -> f64 {
        let (Some(local), Some(usd)) = (
            self.columns.get(currency),
            self.columns.get(&CurrencyCode::usd()),
        ) else {
            return 0.0;
        };

        // rows are taken in date order so "trailing" means most recent
        let mut order: Vec<usize> = (0..self.dates.len().min(local.len()).min(usd.len())).collect();
        order.sort_by_key(|&i| self.dates[i]);

        let diffs: Vec<f64> = order
            .iter()
            .filter_map(|&i| match (local[i], usd[i]) {
                (Some(l), Some(u)) => Some(l - u),
                _ => None,
            })
            .collect();
        if diffs.is_empty() {
            return 0.0;
        }
        let tail = &diffs[diffs.len().saturating_sub(CARRY_LOOKBACK)..];
        tail.iter().sum::<f64>() / tail.len() as f64 / 100.0
    }
}

/// Everything the engine needs from the market data collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketData {
    pub quotes: Vec<FxQuote>,
    #[serde(default)]
    pub conventions: QuoteConventions,
    #[serde(default)]
    pub rates: RateTable,
}

impl MarketData {
    /// Requested currencies with no FX quotes at all.
    pub fn missing_currencies(&self, requested: &[CurrencyCode]) -> Vec<CurrencyCode> {
        let mut missing: Vec<CurrencyCode> = requested
            .iter()
            .filter(|c| !self.quotes.iter().any(|q| &q.currency == *c))
            .cloned()
            .collect();
        missing.sort();
        missing
    }

    /// Return series over the requested currencies that have quotes.
    pub fn return_series(&self, requested: &[CurrencyCode]) -> Result<ReturnSeries, MarketDataError> {
        let present: Vec<CurrencyCode> = requested
            .iter()
            .filter(|c| self.quotes.iter().any(|q| &q.currency == *c))
            .cloned()
            .collect();
        ReturnSeries::from_quotes(&self.quotes, &present, &self.conventions)
    }

    pub fn spot(&self, currencies: &[CurrencyCode]) -> Result<SpotVector, MarketDataError> {
        SpotVector::from_quotes(&self.quotes, currencies, &self.conventions)
    }

    /// Carry differential per currency, aligned with `currencies`.
    pub fn carries(&self, currencies: &[CurrencyCode]) -> Vec<f64> {
        currencies.iter().map(|c| self.rates.differential(c)).collect()
    }
}

/// Pivot normalized quotes into date -> (currency -> level), restricted to
/// `currencies`. Later duplicates for the same (date, currency) win.
fn pivot_normalized<'a>(
    quotes: &[FxQuote],
    currencies: &'a [CurrencyCode],
    conventions: &QuoteConventions,
) -> Result<BTreeMap<NaiveDate, HashMap<&'a CurrencyCode, f64>>, MarketDataError> {
    let mut pivot: BTreeMap<NaiveDate, HashMap<&CurrencyCode, f64>> = BTreeMap::new();
    for quote in quotes {
        let Some(currency) = currencies.iter().find(|c| **c == quote.currency) else {
            continue;
        };
        if !(quote.fx.is_finite() && quote.fx > 0.0) {
            return Err(MarketDataError::InvalidQuote {
                currency: quote.currency.clone(),
                date: quote.date,
                fx: quote.fx,
            });
        }
        pivot
            .entry(quote.date)
            .or_default()
            .insert(currency, conventions.normalize(currency, quote.fx));
    }
    Ok(pivot)
}
