//! Constant-hazard default times.
//!
//! An annual PD maps to a hazard `λ = -ln(1 - PD)`, and a default time is
//! an exponential draw `-ln(1 - u) / λ`. Draws past the tenor mean the
//! obligor survives the deal.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Floor on `1 - PD` before taking the log.
const SURVIVAL_FLOOR: f64 = 1e-8;
/// Floor on the hazard rate.
const HAZARD_FLOOR: f64 = 1e-8;
/// Floor on `1 - u` for the exponential draw.
const UNIFORM_FLOOR: f64 = 1e-12;

/// Hazard rate for an annual default probability.
///
/// Degenerate PDs are clamped: PD >= 1 gives a large finite hazard and
/// PD <= 0 gives the floor, so the result is always finite and positive.
pub fn hazard_rate(pd_annual: f64) -> f64 {
    let hazard = -(1.0 - pd_annual).max(SURVIVAL_FLOOR).ln();
    hazard.max(HAZARD_FLOOR)
}

/// One entry per path: `Some(t)` with `t` in `(0, tenor]`, or `None` when
/// the path survives the tenor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultTimeVector {
    times: Vec<Option<f64>>,
}

impl DefaultTimeVector {
    pub fn new(times: Vec<Option<f64>>) -> Self {
        Self { times }
    }

    pub fn times(&self) -> &[Option<f64>] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// 1.0 where the path defaulted within the tenor, else 0.0.
    pub fn flags(&self) -> Vec<f64> {
        self.times
            .iter()
            .map(|t| if t.is_some() { 1.0 } else { 0.0 })
            .collect()
    }

    /// Share of paths with a default inside the tenor.
    pub fn default_fraction(&self) -> f64 {
        if self.times.is_empty() {
            return 0.0;
        }
        self.times.iter().filter(|t| t.is_some()).count() as f64 / self.times.len() as f64
    }

    /// Default time, or `tenor_years` for surviving paths.
    pub fn horizon(&self, path: usize, tenor_years: f64) -> f64 {
        self.times[path].unwrap_or(tenor_years)
    }
}

/// Seeded default-time sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultTimeGenerator {
    pub tenor_years: f64,
    pub paths: usize,
    pub seed: u64,
}

impl DefaultTimeGenerator {
    pub fn new(tenor_years: f64, paths: usize, seed: u64) -> Self {
        Self {
            tenor_years,
            paths,
            seed,
        }
    }

    /// Standard exponential draws `-ln(1 - u)`, one per path.
    ///
    /// Shared by the flat and per-path PD samplers so both see the same
    /// uniform stream for a given seed.
    fn unit_exponentials(&self) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.paths)
            .map(|_| {
                let u: f64 = rng.gen();
                -(1.0 - u).max(UNIFORM_FLOOR).ln()
            })
            .collect()
    }

    fn cap(&self, t: f64) -> Option<f64> {
        (t <= self.tenor_years).then_some(t)
    }

    /// Default times under a single annual PD.
    pub fn generate(&self, pd_annual: f64) -> DefaultTimeVector {
        let hazard = hazard_rate(pd_annual);
        let times: Vec<Option<f64>> = self
            .unit_exponentials()
            .into_iter()
            .map(|e| self.cap(e / hazard))
            .collect();
        let out = DefaultTimeVector::new(times);
        log::debug!(
            "default times: pd={pd_annual}, hazard={hazard:.6}, {:.2}% of {} paths default",
            out.default_fraction() * 100.0,
            self.paths
        );
        out
    }

    /// Default times with a PD per path (same length as the path count).
    ///
    /// # Panics
    ///
    /// Panics if `pds.len()` differs from the path count.
    pub fn generate_with_pds(&self, pds: &[f64]) -> DefaultTimeVector {
        assert_eq!(pds.len(), self.paths, "need one PD per path");
        let times = self
            .unit_exponentials()
            .into_iter()
            .zip(pds)
            .map(|(e, &pd)| self.cap(e / hazard_rate(pd)))
            .collect();
        DefaultTimeVector::new(times)
    }
}
