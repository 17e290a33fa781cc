use ndarray::{Array1, ArrayView1};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Observed ({observed}) and predicted ({predicted}) lengths differ.")]
    LengthMismatch { observed: usize, predicted: usize },

    #[error("RMSE is undefined for empty sequences.")]
    EmptyInput,
}

/// Root-mean-square error between observed and predicted values, along with
/// the per-observation residuals (observed minus predicted).
pub fn calc_rmse(
    observed: ArrayView1<f64>,
    predicted: ArrayView1<f64>,
) -> Result<(f64, Array1<f64>), StatsError> {
    if observed.len() != predicted.len() {
        return Err(StatsError::LengthMismatch {
            observed: observed.len(),
            predicted: predicted.len(),
        });
    }
    if observed.is_empty() {
        return Err(StatsError::EmptyInput);
    }

    let residual = &observed - &predicted;
    let mean_sq = residual.iter().map(|r| r * r).sum::<f64>() / residual.len() as f64;
    Ok((mean_sq.sqrt(), residual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn perfect_predictions_give_zero_rmse() {
        let observed = array![1.0, 2.0, 3.0];
        let (rmse, residual) = calc_rmse(observed.view(), observed.view()).unwrap();
        assert_eq!(rmse, 0.0);
        assert!(residual.iter().all(|&r| r == 0.0));
    }

    #[test]
    fn rmse_matches_hand_computation() {
        let observed = array![1.0, 2.0, 3.0, 4.0];
        let predicted = array![2.0, 2.0, 2.0, 2.0];
        let (rmse, residual) = calc_rmse(observed.view(), predicted.view()).unwrap();
        // residuals -1, 0, 1, 2 -> mean square 1.5
        assert_abs_diff_eq!(rmse, 1.5f64.sqrt(), epsilon = 1e-12);
        assert_eq!(residual, array![-1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn mismatched_lengths_fail_fast() {
        let observed = array![1.0, 2.0];
        let predicted = array![1.0, 2.0, 3.0];
        assert!(matches!(
            calc_rmse(observed.view(), predicted.view()),
            Err(StatsError::LengthMismatch {
                observed: 2,
                predicted: 3
            })
        ));
    }

    #[test]
    fn empty_input_fails_fast() {
        let empty = Array1::<f64>::zeros(0);
        assert!(matches!(
            calc_rmse(empty.view(), empty.view()),
            Err(StatsError::EmptyInput)
        ));
    }
}
