//! Naive and seasonal-naive in-sample predictions.

/// Value `lag` periods earlier; the first `lag` entries are `NaN`.
pub fn lagged(values: &[f64], lag: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| if i < lag { f64::NAN } else { values[i - lag] })
        .collect()
}

/// Lag-1 prediction.
pub fn naive(values: &[f64]) -> Vec<f64> {
    lagged(values, 1)
}

/// Prediction from the same season one cycle earlier.
pub fn seasonal_naive(values: &[f64], period: usize) -> Vec<f64> {
    lagged(values, period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naive_shifts_by_one() {
        let y = [1.0, 2.0, 3.0];
        let fitted = naive(&y);
        assert!(fitted[0].is_nan());
        assert_eq!(&fitted[1..], &[1.0, 2.0]);
    }

    #[test]
    fn seasonal_naive_uses_previous_cycle() {
        let y: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let fitted = seasonal_naive(&y, 12);
        assert!(fitted[..12].iter().all(|v| v.is_nan()));
        assert_eq!(fitted[12], 0.0);
        assert_eq!(fitted[29], 17.0);
        assert!(seasonal_naive(&y[..5], 12).iter().all(|v| v.is_nan()));
    }
}
