//! Observation filters applied before change-model fitting.
//!
//! Quality codes follow the Landsat CFMask convention (see
//! [`crate::config::QaConfig`]): 0 clear, 1 water, 2 cloud shadow, 3 snow,
//! 4 cloud, 255 fill. All functions are pure and elementwise; mask builders
//! are infallible, composites that index spectral bands validate shape first.

use crate::config::QaConfig;
use ndarray::{Array1, ArrayView1, ArrayView2};
use thiserror::Error;

/// Number of spectral bands checked by the saturation filter (band rows
/// 0 through 5 of the observation matrix).
const SPECTRAL_BANDS: usize = 6;

/// Saturation bounds in scaled reflectance units; values on the boundary are
/// treated as saturated.
const SATURATION_FLOOR: f64 = 0.0;
const SATURATION_CEILING: f64 = 10_000.0;

#[derive(Error, Debug)]
pub enum QaError {
    #[error(
        "Observation matrix has {found} band rows but saturation filtering requires at least {required}."
    )]
    MissingSpectralBands { required: usize, found: usize },

    #[error("Thermal band index {thermal_idx} is out of range for a matrix with {bands} band rows.")]
    ThermalBandOutOfRange { thermal_idx: usize, bands: usize },

    #[error("Quality sequence length ({quality}) does not match observation count ({observations}).")]
    LengthMismatch { quality: usize, observations: usize },
}

/// True where the quality code marks snow.
pub fn mask_snow(quality: ArrayView1<u8>, snow: u8) -> Array1<bool> {
    quality.mapv(|q| q == snow)
}

/// True where the quality code marks a clear land observation.
pub fn mask_clear(quality: ArrayView1<u8>, clear: u8) -> Array1<bool> {
    quality.mapv(|q| q == clear)
}

/// True where the quality code marks water.
pub fn mask_water(quality: ArrayView1<u8>, water: u8) -> Array1<bool> {
    quality.mapv(|q| q == water)
}

/// True where the quality code marks fill (no valid observation).
pub fn mask_fill(quality: ArrayView1<u8>, fill: u8) -> Array1<bool> {
    quality.mapv(|q| q == fill)
}

/// True where the observation is either clear land or water.
pub fn mask_clear_or_water(quality: ArrayView1<u8>, clear: u8, water: u8) -> Array1<bool> {
    quality.mapv(|q| q == clear || q == water)
}

pub fn count_clear_or_water(quality: ArrayView1<u8>, clear: u8, water: u8) -> usize {
    quality.iter().filter(|&&q| q == clear || q == water).count()
}

pub fn count_fill(quality: ArrayView1<u8>, fill: u8) -> usize {
    quality.iter().filter(|&&q| q == fill).count()
}

pub fn count_snow(quality: ArrayView1<u8>, snow: u8) -> usize {
    quality.iter().filter(|&&q| q == snow).count()
}

/// Count of non-fill observations.
pub fn count_total(quality: ArrayView1<u8>, fill: u8) -> usize {
    quality.iter().filter(|&&q| q != fill).count()
}

/// Ratio of clear-or-water observations to all non-fill observations.
///
/// Zero-division policy: with zero non-fill observations this is the IEEE
/// quotient 0/0 and returns NaN. It never panics; callers that cannot accept
/// NaN must guard with [`count_total`] first. `NaN >= threshold` is false, so
/// [`enough_clear`] degrades safely on all-fill input.
pub fn ratio_clear(quality: ArrayView1<u8>, clear: u8, water: u8, fill: u8) -> f64 {
    count_clear_or_water(quality, clear, water) as f64 / count_total(quality, fill) as f64
}

/// Ratio of snow observations to clear/water-plus-snow observations.
///
/// The 0.01 added to the denominator keeps an all-fill input at 0.0 instead
/// of NaN and must not be removed; downstream procedure selection depends on
/// it.
pub fn ratio_snow(quality: ArrayView1<u8>, clear: u8, water: u8, snow: u8) -> f64 {
    let snowy = count_snow(quality, snow) as f64;
    let clear_count = count_clear_or_water(quality, clear, water) as f64;
    snowy / (clear_count + snowy + 0.01)
}

/// Whether clear observations are plentiful enough for the standard
/// procedure.
pub fn enough_clear(quality: ArrayView1<u8>, qa: &QaConfig, threshold: f64) -> bool {
    ratio_clear(quality, qa.clear, qa.water, qa.fill) >= threshold
}

/// Whether snow observations dominate enough for the snow procedure.
pub fn enough_snow(quality: ArrayView1<u8>, qa: &QaConfig, threshold: f64) -> bool {
    ratio_snow(quality, qa.clear, qa.water, qa.snow) >= threshold
}

/// True where none of the six spectral bands is saturated, i.e. every band
/// value lies strictly inside (0, 10000).
///
/// `observations` is band-major: shape (bands, n) with spectral bands in rows
/// 0..6.
pub fn filter_saturated(observations: ArrayView2<f64>) -> Result<Array1<bool>, QaError> {
    if observations.nrows() < SPECTRAL_BANDS {
        return Err(QaError::MissingSpectralBands {
            required: SPECTRAL_BANDS,
            found: observations.nrows(),
        });
    }

    let n = observations.ncols();
    let mut unsaturated = Array1::from_elem(n, true);
    for band in 0..SPECTRAL_BANDS {
        let row = observations.row(band);
        for (flag, &value) in unsaturated.iter_mut().zip(row.iter()) {
            *flag &= SATURATION_FLOOR < value && value < SATURATION_CEILING;
        }
    }
    Ok(unsaturated)
}

/// True where the thermal value falls strictly inside the Kelvin range.
///
/// Thresholds arrive in unscaled Kelvin while the data are scaled by 10, so
/// both bounds are scaled before comparison. Values exactly on a bound are
/// rejected.
pub fn filter_thermal(thermal: ArrayView1<f64>, min_kelvin: f64, max_kelvin: f64) -> Array1<bool> {
    let min_scaled = min_kelvin * 10.0;
    let max_scaled = max_kelvin * 10.0;
    thermal.mapv(|t| t > min_scaled && t < max_scaled)
}

/// Indices considered clear or water.
///
/// Known-suspect contract, preserved on purpose: a single code can never
/// equal both `clear` and `water`, so the conjunction is all-false for every
/// input. The likely-intended semantics are [`mask_clear_or_water`]. Kept
/// until the owners of the segmentation driver decide; the regression test
/// `clear_index_is_always_all_false` pins the current behavior.
pub fn clear_index(quality: ArrayView1<u8>, clear: u8, water: u8) -> Array1<bool> {
    quality.mapv(|q| q == clear && q == water)
}

/// Composite usable-observation mask: clear index, thermal range, and
/// saturation combined.
///
/// Inherits the [`clear_index`] defect and therefore yields an all-false
/// mask; preserved rather than silently fixed.
pub fn standard_filter(
    observations: ArrayView2<f64>,
    quality: ArrayView1<u8>,
    qa: &QaConfig,
) -> Result<Array1<bool>, QaError> {
    if qa.thermal_idx >= observations.nrows() {
        return Err(QaError::ThermalBandOutOfRange {
            thermal_idx: qa.thermal_idx,
            bands: observations.nrows(),
        });
    }
    if quality.len() != observations.ncols() {
        return Err(QaError::LengthMismatch {
            quality: quality.len(),
            observations: observations.ncols(),
        });
    }

    let clear = clear_index(quality, qa.clear, qa.water);
    let thermal = filter_thermal(observations.row(qa.thermal_idx), qa.min_kelvin, qa.max_kelvin);
    let unsaturated = filter_saturated(observations)?;

    let mut mask = clear;
    for ((flag, &t), &u) in mask.iter_mut().zip(thermal.iter()).zip(unsaturated.iter()) {
        *flag &= t && u;
    }
    Ok(mask)
}
