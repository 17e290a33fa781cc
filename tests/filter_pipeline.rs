use ccdc::{
    enough_clear, fitted_model, mask_clear_or_water, standard_filter, EstimationError, ModelConfig,
    QaConfig,
};
use ndarray::{Array1, Array2};
use std::f64::consts::PI;

/// Synthetic scene: 7 band rows (6 spectral + thermal) sampled every 8 days
/// over two years, with a mix of clear, water, cloudy, and fill
/// observations.
struct Scene {
    dates: Vec<i64>,
    observations: Array2<f64>,
    quality: Array1<u8>,
}

fn build_scene() -> Scene {
    let qa = QaConfig::default();
    let w = 2.0 * PI / ModelConfig::default().avg_days_yr;
    let dates: Vec<i64> = (0..92).map(|i| 5000 + i * 8).collect();
    let n = dates.len();

    let mut observations = Array2::<f64>::zeros((7, n));
    let mut quality = Array1::<u8>::zeros(n);

    for (i, &date) in dates.iter().enumerate() {
        let t = date as f64;
        let seasonal = 1800.0 + 600.0 * (w * t).cos() + 200.0 * (w * t).sin();
        for band in 0..6 {
            observations[[band, i]] = seasonal + 50.0 * band as f64;
        }
        observations[[qa.thermal_idx, i]] = 2900.0;

        quality[i] = match i % 6 {
            0 | 1 | 2 => qa.clear,
            3 => qa.water,
            4 => qa.cloud,
            _ => qa.fill,
        };
    }

    Scene {
        dates,
        observations,
        quality,
    }
}

#[test]
fn masked_subset_supports_a_model_fit() {
    let scene = build_scene();
    let qa = QaConfig::default();

    assert!(enough_clear(
        scene.quality.view(),
        &qa,
        qa.clear_pct_threshold
    ));

    let usable = mask_clear_or_water(scene.quality.view(), qa.clear, qa.water);
    let dates: Vec<i64> = scene
        .dates
        .iter()
        .zip(usable.iter())
        .filter_map(|(&d, &keep)| keep.then_some(d))
        .collect();
    let band: Array1<f64> = scene
        .observations
        .row(2)
        .iter()
        .zip(usable.iter())
        .filter_map(|(&v, &keep)| keep.then_some(v))
        .collect();

    assert!(dates.len() > 50);
    assert_eq!(dates.len(), band.len());

    let fit = fitted_model(&dates, band.view(), 4).expect("fit over usable subset");
    assert!(fit.rmse < 1.0, "rmse {}", fit.rmse);
    assert_eq!(fit.residual.len(), dates.len());
}

#[test]
fn standard_filter_selects_nothing_even_on_a_pristine_scene() {
    // Every observation is unsaturated, thermally mid-range, and clear or
    // water, yet the composite mask is empty: the clear-index conjunction
    // defect propagates through the whole pipeline. Fitting over that
    // selection fails up front instead of producing a junk model.
    let scene = build_scene();
    let qa = QaConfig::default();

    let mut quality = scene.quality.clone();
    for code in quality.iter_mut() {
        if *code != qa.clear && *code != qa.water {
            *code = qa.clear;
        }
    }

    let mask = standard_filter(scene.observations.view(), quality.view(), &qa)
        .expect("well-formed inputs");
    assert!(mask.iter().all(|&m| !m));

    let dates: Vec<i64> = scene
        .dates
        .iter()
        .zip(mask.iter())
        .filter_map(|(&d, &keep)| keep.then_some(d))
        .collect();
    let band: Array1<f64> = scene
        .observations
        .row(0)
        .iter()
        .zip(mask.iter())
        .filter_map(|(&v, &keep)| keep.then_some(v))
        .collect();

    assert!(matches!(
        fitted_model(&dates, band.view(), 4),
        Err(EstimationError::EmptyInput)
    ));
}
