//! Accuracy metrics for comparing forecasts with observations.

use super::StatsError;

fn check_len(actual: &[f64], predicted: &[f64]) -> Result<(), StatsError> {
    if actual.len() != predicted.len() {
        return Err(StatsError::LengthMismatch {
            actual: actual.len(),
            predicted: predicted.len(),
        });
    }
    Ok(())
}

/// Residuals of the pairs where both sides are present.
fn paired_errors<'a>(
    actual: &'a [f64],
    predicted: &'a [f64],
) -> impl Iterator<Item = f64> + 'a {
    actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| !a.is_nan() && !p.is_nan())
        .map(|(a, p)| a - p)
}

fn mean_of(iter: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = iter.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

/// Mean absolute error. `NaN` when no pair is usable.
pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64, StatsError> {
    check_len(actual, predicted)?;
    Ok(mean_of(paired_errors(actual, predicted).map(f64::abs)))
}

/// Root mean squared error. `NaN` when no pair is usable.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64, StatsError> {
    check_len(actual, predicted)?;
    Ok(mean_of(paired_errors(actual, predicted).map(|e| e * e)).sqrt())
}

/// Mean absolute percentage error in percent. Zero actuals are skipped.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Result<f64, StatsError> {
    check_len(actual, predicted)?;
    let ratios = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| !a.is_nan() && !p.is_nan() && **a != 0.0)
        .map(|(a, p)| ((a - p) / a).abs());
    Ok(mean_of(ratios) * 100.0)
}

/// MAE, RMSE and MAPE of one forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accuracy {
    pub mae: f64,
    pub rmse: f64,
    pub mape: f64,
}

impl Accuracy {
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Result<Self, StatsError> {
        Ok(Accuracy {
            mae: mae(actual, predicted)?,
            rmse: rmse(actual, predicted)?,
            mape: mape(actual, predicted)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perfect_forecast_scores_zero() {
        let y = [1.0, 2.0, 3.0];
        let acc = Accuracy::compute(&y, &y).unwrap();
        assert_eq!(acc, Accuracy { mae: 0.0, rmse: 0.0, mape: 0.0 });
    }

    #[test]
    fn known_values() {
        let actual = [2.0, 4.0, 0.0, f64::NAN];
        let predicted = [1.0, 6.0, 1.0, 5.0];
        assert_relative_eq!(mae(&actual, &predicted).unwrap(), 4.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(rmse(&actual, &predicted).unwrap(), 2.0_f64.sqrt(), epsilon = 1e-12);
        // zero actual skipped: (0.5 + 0.5) / 2
        assert_relative_eq!(mape(&actual, &predicted).unwrap(), 50.0, epsilon = 1e-12);
    }

    #[test]
    fn rmse_dominates_mae() {
        let actual: Vec<f64> = (0..50).map(|i| (i as f64 * 1.3).sin() * 7.0).collect();
        for shift in [0.0, 0.5, -3.0] {
            let predicted: Vec<f64> = actual
                .iter()
                .enumerate()
                .map(|(i, a)| a + shift + (i % 7) as f64 - 3.0)
                .collect();
            let m = mae(&actual, &predicted).unwrap();
            let r = rmse(&actual, &predicted).unwrap();
            assert!(m >= 0.0 && r >= 0.0);
            assert!(r + 1e-12 >= m);
        }
    }

    #[test]
    fn empty_and_mismatched_inputs() {
        assert!(mae(&[f64::NAN], &[1.0]).unwrap().is_nan());
        assert!(mape(&[0.0], &[1.0]).unwrap().is_nan());
        assert_eq!(
            rmse(&[1.0], &[1.0, 2.0]),
            Err(StatsError::LengthMismatch { actual: 1, predicted: 2 })
        );
    }
}
