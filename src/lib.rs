#![deny(dead_code)]
#![deny(unused_imports)]

pub mod basis;
pub mod cache;
pub mod config;
pub mod lasso;
pub mod qa;
pub mod stats;

pub use basis::{coefficient_matrix, BasisError, COEFFICIENT_COLUMNS};
pub use cache::{shared_cache, BasisCache};
pub use config::{ModelConfig, QaConfig};
pub use lasso::{
    fitted_model, fitted_model_with, EstimationError, FittedModel, LassoEngine, LassoModel,
    LinearModel, RegressionEngine,
};
pub use qa::{
    clear_index, count_clear_or_water, count_fill, count_snow, count_total, enough_clear,
    enough_snow, filter_saturated, filter_thermal, mask_clear, mask_clear_or_water, mask_fill,
    mask_snow, mask_water, ratio_clear, ratio_snow, standard_filter, QaError,
};
pub use stats::{calc_rmse, StatsError};
