use crate::core::currency::CurrencyCode;
use crate::core::market::{ReturnSeries, SpotVector};
use crate::simulation::correlation::{sample_covariance, sample_mean, stressed_covariance};
use crate::simulation::SimulationError;
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// How monthly return shocks are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    /// Bootstrap whole historical return rows.
    #[default]
    Historical,
    /// Multivariate normal fitted to the sample moments.
    Parametric,
}

/// Simulated spot levels indexed by (path, month, currency).
///
/// Month 0 is one simulated step after the starting spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathTensor {
    paths: usize,
    months: usize,
    currencies: Vec<CurrencyCode>,
    data: Vec<f64>,
}

impl PathTensor {
    pub fn paths(&self) -> usize {
        self.paths
    }

    pub fn months(&self) -> usize {
        self.months
    }

    pub fn currencies(&self) -> &[CurrencyCode] {
        &self.currencies
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.paths, self.months, self.currencies.len())
    }

    #[inline]
    fn offset(&self, path: usize, month: usize, ccy: usize) -> usize {
        (path * self.months + month) * self.currencies.len() + ccy
    }

    /// Spot level of currency `ccy` on `path` at `month`.
    #[inline]
    pub fn spot(&self, path: usize, month: usize, ccy: usize) -> f64 {
        self.data[self.offset(path, month, ccy)]
    }

    /// All currencies on `path` at `month`.
    pub fn step(&self, path: usize, month: usize) -> &[f64] {
        let start = self.offset(path, month, 0);
        &self.data[start..start + self.currencies.len()]
    }

    /// Flat view in (path, month, currency) order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Monte Carlo FX path generator.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use mtm_guarantee::core::currency::CurrencyCode;
/// use mtm_guarantee::core::market::{ReturnSeries, SpotVector};
/// use mtm_guarantee::simulation::paths::{PathSimulator, SimulationMode};
/// use nalgebra::DMatrix;
///
/// let kes = CurrencyCode::new("KES");
/// let dates = (1..=3).map(|m| NaiveDate::from_ymd_opt(2023, m, 1).unwrap()).collect();
/// let returns = ReturnSeries::new(
///     dates,
///     vec![kes.clone()],
///     DMatrix::from_column_slice(3, 1, &[0.01, -0.02, 0.005]),
/// ).unwrap();
/// let spot = SpotVector::new(vec![kes], vec![130.0]).unwrap();
///
/// let sim = PathSimulator::new(1, 100, SimulationMode::Historical, 1.0, 42);
/// let paths = sim.simulate(&returns, &spot).unwrap();
/// assert_eq!(paths.shape(), (100, 12, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSimulator {
    pub tenor_years: u32,
    pub paths: usize,
    pub mode: SimulationMode,
    pub corr_stress: f64,
    pub seed: u64,
}

impl PathSimulator {
    pub fn new(tenor_years: u32, paths: usize, mode: SimulationMode, corr_stress: f64, seed: u64) -> Self {
        Self {
            tenor_years,
            paths,
            mode,
            corr_stress,
            seed,
        }
    }

    pub fn months(&self) -> usize {
        self.tenor_years as usize * 12
    }

    /// Simulate spot paths for the currencies of `spot`, in its order.
    pub fn simulate(
        &self,
        returns: &ReturnSeries,
        spot: &SpotVector,
    ) -> Result<PathTensor, SimulationError> {
        if self.tenor_years == 0 {
            return Err(SimulationError::InvalidInput("tenor must be at least one year".into()));
        }
        if self.paths == 0 {
            return Err(SimulationError::InvalidInput("path count must be positive".into()));
        }
        if spot.is_empty() {
            return Err(SimulationError::InvalidInput("no currencies selected".into()));
        }
        let sample = returns.select(spot.currencies())?;
        if sample.nrows() == 0 {
            return Err(SimulationError::InvalidInput("return series is empty".into()));
        }

        let months = self.months();
        let n_ccy = spot.len();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let shocks = match self.mode {
            SimulationMode::Historical => bootstrap_shocks(&sample, self.paths, months, &mut rng),
            SimulationMode::Parametric => {
                gaussian_shocks(&sample, self.corr_stress, self.paths, months, &mut rng)?
            }
        };

        // cumulative log-return per (path, currency), exponentiated onto spot
        let s0 = spot.levels();
        let mut data = Vec::with_capacity(self.paths * months * n_ccy);
        let mut cum = vec![0.0; n_ccy];
        for p in 0..self.paths {
            cum.iter_mut().for_each(|c| *c = 0.0);
            for m in 0..months {
                let row = (p * months + m) * n_ccy;
                for j in 0..n_ccy {
                    cum[j] += shocks[row + j];
                    data.push(s0[j] * cum[j].exp());
                }
            }
        }

        log::debug!(
            "simulated {:?} paths: {} paths x {} months x {} currencies",
            self.mode,
            self.paths,
            months,
            n_ccy
        );

        Ok(PathTensor {
            paths: self.paths,
            months,
            currencies: spot.currencies().to_vec(),
            data,
        })
    }
}

/// Draw whole historical rows so currencies keep their joint moves.
fn bootstrap_shocks(sample: &DMatrix<f64>, paths: usize, months: usize, rng: &mut StdRng) -> Vec<f64> {
    let rows = sample.nrows();
    let n_ccy = sample.ncols();
    let mut shocks = Vec::with_capacity(paths * months * n_ccy);
    for _ in 0..paths * months {
        let r = rng.gen_range(0..rows);
        shocks.extend(sample.row(r).iter());
    }
    shocks
}

fn gaussian_shocks(
    sample: &DMatrix<f64>,
    corr_stress: f64,
    paths: usize,
    months: usize,
    rng: &mut StdRng,
) -> Result<Vec<f64>, SimulationError> {
    let n_ccy = sample.ncols();
    let mu = sample_mean(sample);
    let cov = stressed_covariance(&sample_covariance(sample), corr_stress);
    let chol = cov
        .clone()
        .cholesky()
        .ok_or(SimulationError::DegenerateCovariance { dimension: n_ccy })?;
    let l = chol.l();

    let mut shocks = Vec::with_capacity(paths * months * n_ccy);
    let mut z = DVector::<f64>::zeros(n_ccy);
    for _ in 0..paths * months {
        for zi in z.iter_mut() {
            *zi = rng.sample(StandardNormal);
        }
        let x = &mu + &l * &z;
        shocks.extend(x.iter());
    }
    Ok(shocks)
}
