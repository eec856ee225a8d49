//! Sample moments of a return matrix and correlation stress.
//!
//! A stressed correlation matrix moves every off-diagonal entry away from
//! (or towards) independence: `C_s = I + (C - I) * stress`. The diagonal
//! stays at one for any stress, so `stress = 0` yields independent
//! currencies and `stress = 1` the fitted correlation.

use nalgebra::{DMatrix, DVector};

/// Column means of a (observations x variables) matrix.
pub fn sample_mean(returns: &DMatrix<f64>) -> DVector<f64> {
    let n = returns.nrows().max(1) as f64;
    DVector::from_iterator(
        returns.ncols(),
        returns.column_iter().map(|col| col.sum() / n),
    )
}

/// Unbiased sample covariance (denominator `n - 1`).
///
/// Fewer than two observations give a zero matrix.
pub fn sample_covariance(returns: &DMatrix<f64>) -> DMatrix<f64> {
    let n = returns.nrows();
    let k = returns.ncols();
    if n < 2 {
        return DMatrix::zeros(k, k);
    }
    let mean = sample_mean(returns);
    let mut centered = returns.clone();
    for (j, mut col) in centered.column_iter_mut().enumerate() {
        col.add_scalar_mut(-mean[j]);
    }
    (centered.transpose() * &centered) / (n as f64 - 1.0)
}

/// Correlation implied by a covariance matrix.
///
/// Entries involving a zero-variance column are undefined and reported as
/// zero; the diagonal is always one.
pub fn correlation_from_covariance(cov: &DMatrix<f64>) -> DMatrix<f64> {
    let k = cov.nrows();
    let sd: Vec<f64> = (0..k).map(|i| cov[(i, i)].max(0.0).sqrt()).collect();
    DMatrix::from_fn(k, k, |i, j| {
        if i == j {
            1.0
        } else if sd[i] > 0.0 && sd[j] > 0.0 {
            cov[(i, j)] / (sd[i] * sd[j])
        } else {
            0.0
        }
    })
}

/// Blend a correlation matrix with the identity: `I + (C - I) * stress`.
pub fn stressed_correlation(corr: &DMatrix<f64>, stress: f64) -> DMatrix<f64> {
    let ident = DMatrix::<f64>::identity(corr.nrows(), corr.ncols());
    &ident + (corr - &ident) * stress
}

/// Covariance rebuilt from sample volatilities and a stressed correlation.
///
/// `cov_s = D * C_s * D` with `D = diag(sqrt(diag(cov)))`. With
/// `stress = 1` this returns the sample covariance (up to rounding).
pub fn stressed_covariance(cov: &DMatrix<f64>, stress: f64) -> DMatrix<f64> {
    let corr = stressed_correlation(&correlation_from_covariance(cov), stress);
    let sd = DMatrix::from_diagonal(&DVector::from_iterator(
        cov.nrows(),
        (0..cov.nrows()).map(|i| cov[(i, i)].max(0.0).sqrt()),
    ));
    &sd * corr * &sd
}
