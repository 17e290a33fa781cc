use ndarray::Array2;
use std::f64::consts::PI;
use thiserror::Error;

#[cfg(test)]
use approx::assert_abs_diff_eq;

/// Width of every design matrix produced by this module. Downstream fitting
/// always operates against the full 8-wide matrix; columns beyond those
/// implied by the requested coefficient count are left at exactly zero, and
/// column 7 is reserved and never populated.
pub const COEFFICIENT_COLUMNS: usize = 8;

/// Errors raised while constructing harmonic design matrices or the cache
/// that memoizes them.
#[derive(Error, Debug)]
pub enum BasisError {
    #[error("Coefficient count must be 4, 6, or 8, but was {0}.")]
    InvalidCoefficientCount(usize),

    #[error("Annual period must be finite and positive, but was {0}.")]
    InvalidPeriod(f64),

    #[error("Design-matrix cache capacity must be at least 1 entry.")]
    ZeroCacheCapacity,
}

/// Build the harmonic design matrix for a sequence of ordinal observation
/// dates.
///
/// Column 0 carries the raw dates. Columns 1 and 2 carry the cosine/sine
/// pair at the annual frequency `2π / avg_days_yr`. The second and third
/// harmonics (columns 3–4 and 5–6) are populated only when `num_coeffs`
/// reaches 6 and 8 respectively, so the output shape is `(dates.len(), 8)`
/// regardless of the requested complexity.
///
/// An empty date sequence produces a `(0, 8)` matrix rather than an error.
pub fn coefficient_matrix(
    dates: &[i64],
    num_coeffs: usize,
    avg_days_yr: f64,
) -> Result<Array2<f64>, BasisError> {
    if !matches!(num_coeffs, 4 | 6 | 8) {
        return Err(BasisError::InvalidCoefficientCount(num_coeffs));
    }
    if !avg_days_yr.is_finite() || avg_days_yr <= 0.0 {
        return Err(BasisError::InvalidPeriod(avg_days_yr));
    }

    let w = 2.0 * PI / avg_days_yr;
    let mut matrix = Array2::<f64>::zeros((dates.len(), COEFFICIENT_COLUMNS));

    for (i, &date) in dates.iter().enumerate() {
        let t = date as f64;
        matrix[[i, 0]] = t;
        matrix[[i, 1]] = (w * t).cos();
        matrix[[i, 2]] = (w * t).sin();

        if num_coeffs >= 6 {
            matrix[[i, 3]] = (2.0 * w * t).cos();
            matrix[[i, 4]] = (2.0 * w * t).sin();
        }
        if num_coeffs == 8 {
            matrix[[i, 5]] = (3.0 * w * t).cos();
            matrix[[i, 6]] = (3.0 * w * t).sin();
        }
    }

    Ok(matrix)
}
