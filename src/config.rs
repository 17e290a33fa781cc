use serde::{Deserialize, Serialize};

/// Quality-band codes and filtering thresholds.
///
/// The code values follow the Landsat CFMask convention: 0 clear, 1 water,
/// 2 cloud shadow, 3 snow, 4 cloud, 255 fill. Every function in [`crate::qa`]
/// takes the codes it needs explicitly, so alternative QA schemes can be
/// supplied by constructing a different `QaConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaConfig {
    pub clear: u8,
    pub water: u8,
    pub cloud_shadow: u8,
    pub snow: u8,
    pub cloud: u8,
    pub fill: u8,
    /// Minimum ratio of clear/water observations for the richer models.
    pub clear_pct_threshold: f64,
    /// Minimum snow ratio above which the snow-specific procedure applies.
    pub snow_pct_threshold: f64,
    /// Row index of the thermal band in a (bands, observations) matrix.
    pub thermal_idx: usize,
    /// Thermal acceptance range, unscaled Kelvin. [-93.2C, 70.7C].
    pub min_kelvin: f64,
    pub max_kelvin: f64,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            clear: 0,
            water: 1,
            cloud_shadow: 2,
            snow: 3,
            cloud: 4,
            fill: 255,
            clear_pct_threshold: 0.25,
            snow_pct_threshold: 0.75,
            thermal_idx: 6,
            min_kelvin: 179.95,
            max_kelvin: 343.85,
        }
    }
}

/// Harmonic-model and solver parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Length of the seasonal cycle in ordinal-date units.
    pub avg_days_yr: f64,
    /// L1 regularization strength of the lasso fit.
    pub alpha: f64,
    /// Coordinate-descent sweep limit before reporting non-convergence.
    pub max_iterations: usize,
    /// Convergence tolerance on the largest single-coefficient update.
    pub convergence_tolerance: f64,
    /// Capacity of the shared design-matrix cache.
    pub coefficient_cache_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            avg_days_yr: 365.25,
            alpha: 0.1,
            max_iterations: 1000,
            convergence_tolerance: 1e-4,
            coefficient_cache_size: 1000,
        }
    }
}
