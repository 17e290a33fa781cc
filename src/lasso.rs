use crate::basis::BasisError;
use crate::cache::{shared_cache, BasisCache};
use crate::config::ModelConfig;
use crate::stats::{calc_rmse, StatsError};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use thiserror::Error;

/// Errors surfaced by model fitting.
#[derive(Error, Debug)]
pub enum EstimationError {
    #[error("Underlying basis construction failed: {0}")]
    Basis(#[from] BasisError),

    #[error("Degrees of freedom must be 4, 6, or 8, but was {0}.")]
    InvalidDegreesOfFreedom(usize),

    #[error("Cannot fit a model to an empty observation sequence.")]
    EmptyInput,

    #[error("Observation count ({observations}) does not match date count ({dates}).")]
    LengthMismatch { dates: usize, observations: usize },

    #[error("Design matrix has {rows} rows but {targets} target values were supplied.")]
    DesignTargetMismatch { rows: usize, targets: usize },

    #[error("Observation at index {index} is not finite ({value}).")]
    NonFiniteObservation { index: usize, value: f64 },

    #[error("Coordinate descent failed to converge within {iterations} sweeps.")]
    DidNotConverge { iterations: usize },

    #[error("Residual diagnostics failed: {0}")]
    Stats(#[from] StatsError),
}

/// A trained regression model that can score a design matrix.
pub trait LinearModel {
    fn predict(&self, design: ArrayView2<f64>) -> Array1<f64>;
}

/// Capability seam for the regression engine. Any L1-penalized linear
/// regression satisfying `fit(X, y) -> model` / `model.predict(X) -> y`
/// is substitutable here.
pub trait RegressionEngine {
    type Model: LinearModel;

    fn fit(
        &self,
        design: ArrayView2<f64>,
        targets: ArrayView1<f64>,
    ) -> Result<Self::Model, EstimationError>;
}

/// Lasso solved by cyclic coordinate descent.
///
/// Minimizes `(1/2n)·‖y − Xw − b‖² + alpha·‖w‖₁` with an unpenalized
/// intercept, recovered by centering the columns and targets before the
/// descent. Zero-variance columns (the reserved design column, unpopulated
/// harmonics) keep a coefficient of exactly zero.
#[derive(Debug, Clone, PartialEq)]
pub struct LassoEngine {
    pub alpha: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl LassoEngine {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            alpha: config.alpha,
            max_iterations: config.max_iterations,
            tolerance: config.convergence_tolerance,
        }
    }
}

impl Default for LassoEngine {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default())
    }
}

/// Coefficients and intercept of a fitted lasso model.
#[derive(Debug, Clone, PartialEq)]
pub struct LassoModel {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

impl LinearModel for LassoModel {
    fn predict(&self, design: ArrayView2<f64>) -> Array1<f64> {
        design.dot(&self.coefficients) + self.intercept
    }
}

impl RegressionEngine for LassoEngine {
    type Model = LassoModel;

    fn fit(
        &self,
        design: ArrayView2<f64>,
        targets: ArrayView1<f64>,
    ) -> Result<LassoModel, EstimationError> {
        let n = design.nrows();
        let p = design.ncols();
        if n == 0 {
            return Err(EstimationError::EmptyInput);
        }
        if targets.len() != n {
            return Err(EstimationError::DesignTargetMismatch {
                rows: n,
                targets: targets.len(),
            });
        }

        // Center columns and targets; the intercept absorbs the means.
        let mut column_means = Array1::<f64>::zeros(p);
        for (j, column) in design.axis_iter(Axis(1)).enumerate() {
            column_means[j] = column.sum() / n as f64;
        }
        let target_mean = targets.sum() / n as f64;

        let mut centered = design.to_owned();
        for (j, mut column) in centered.axis_iter_mut(Axis(1)).enumerate() {
            let mean = column_means[j];
            column.mapv_inplace(|v| v - mean);
        }

        let column_sq: Vec<f64> = centered
            .axis_iter(Axis(1))
            .map(|column| column.dot(&column))
            .collect();

        // Subgradient optimality gives a soft threshold of alpha*n on the
        // unnormalized correlations X_j'r.
        let threshold = self.alpha * n as f64;

        let mut weights = Array1::<f64>::zeros(p);
        let mut residual = targets.to_owned() - target_mean;
        let mut converged_after = None;

        for sweep in 0..self.max_iterations {
            let mut max_delta = 0.0f64;
            let mut max_weight = 0.0f64;

            for j in 0..p {
                if column_sq[j] == 0.0 {
                    continue;
                }
                let column = centered.column(j);
                let old = weights[j];
                let correlation = column.dot(&residual) + old * column_sq[j];
                let new = soft_threshold(correlation, threshold) / column_sq[j];

                if new != old {
                    let delta = new - old;
                    for (r, &x) in residual.iter_mut().zip(column.iter()) {
                        *r -= delta * x;
                    }
                    weights[j] = new;
                }

                max_delta = max_delta.max((new - old).abs());
                max_weight = max_weight.max(new.abs());
            }

            if max_delta <= self.tolerance * max_weight.max(1.0) {
                converged_after = Some(sweep + 1);
                break;
            }
        }

        let sweeps = converged_after.ok_or(EstimationError::DidNotConverge {
            iterations: self.max_iterations,
        })?;
        log::debug!("lasso converged after {sweeps} coordinate-descent sweeps");

        let intercept = target_mean - column_means.dot(&weights);
        Ok(LassoModel {
            coefficients: weights,
            intercept,
        })
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

/// Trained model plus residual diagnostics for one fitting call. Owned by
/// the caller; the crate retains nothing after returning it.
#[derive(Debug, Clone)]
pub struct FittedModel<M> {
    pub model: M,
    pub rmse: f64,
    pub residual: Array1<f64>,
}

/// Fit a lasso harmonic model with the default configuration, engine, and
/// the process-wide design-matrix cache.
///
/// `df` selects how many harmonic terms participate (4, 6, or 8). The shared
/// cache keys on the date sequence alone, so mixing `df` values over the same
/// dates within one process re-serves the first matrix built; see
/// [`BasisCache`].
pub fn fitted_model(
    dates: &[i64],
    observations: ArrayView1<f64>,
    df: usize,
) -> Result<FittedModel<LassoModel>, EstimationError> {
    let config = ModelConfig::default();
    fitted_model_with(
        &LassoEngine::from_config(&config),
        shared_cache(),
        &config,
        dates,
        observations,
        df,
    )
}

/// Fully injected variant of [`fitted_model`]: caller supplies the engine,
/// cache, and configuration.
pub fn fitted_model_with<E: RegressionEngine>(
    engine: &E,
    cache: &BasisCache,
    config: &ModelConfig,
    dates: &[i64],
    observations: ArrayView1<f64>,
    df: usize,
) -> Result<FittedModel<E::Model>, EstimationError> {
    if !matches!(df, 4 | 6 | 8) {
        return Err(EstimationError::InvalidDegreesOfFreedom(df));
    }
    if dates.is_empty() {
        return Err(EstimationError::EmptyInput);
    }
    if observations.len() != dates.len() {
        return Err(EstimationError::LengthMismatch {
            dates: dates.len(),
            observations: observations.len(),
        });
    }
    for (index, &value) in observations.iter().enumerate() {
        if !value.is_finite() {
            return Err(EstimationError::NonFiniteObservation { index, value });
        }
    }

    let design = cache.coefficients(dates, df, config.avg_days_yr)?;
    let model = engine.fit(design.view(), observations)?;
    let predictions = model.predict(design.view());
    let (rmse, residual) = calc_rmse(observations, predictions.view())?;

    Ok(FittedModel {
        model,
        rmse,
        residual,
    })
}
