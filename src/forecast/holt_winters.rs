//! Additive Holt-Winters overlay on top of `anofox_forecast`.
//!
//! Smoothing parameters are estimated once on the whole series. Forecasts
//! from an earlier origin refit those parameters on the prefix ending there,
//! which reproduces the filter state at that origin because initialisation
//! only reads the first two seasons.

use anofox_forecast::core::TimeSeries;
use anofox_forecast::models::exponential::{HoltWinters, SeasonalType};
use anofox_forecast::models::Forecaster;
use chrono::{DateTime, Utc};

use super::error::{ForecastError, Result};
use super::evaluate::MAX_HORIZON;

/// A fitted additive Holt-Winters model.
#[derive(Debug, Clone)]
pub struct HoltWintersFit {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    /// One-step-ahead in-sample predictions, `NaN` over the first season.
    pub fitted: Vec<f64>,
    /// `paths[t]` holds the forecasts for `h = 1..=MAX_HORIZON` made after
    /// observing `y_t`. Empty while fewer than two seasons are observed.
    paths: Vec<Vec<f64>>,
}

impl HoltWintersFit {
    /// Estimate the smoothing parameters on `values` and precompute the
    /// forecast path from every usable origin.
    pub fn fit(values: &[f64], period: usize) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if period == 0 || values.len() < 2 * period {
            return Err(ForecastError::InsufficientData {
                needed: 2 * period.max(1),
                got: values.len(),
            });
        }
        if values.iter().any(|v| v.is_nan()) {
            return Err(ForecastError::MissingValues);
        }

        let mut model = HoltWinters::auto(period, SeasonalType::Additive);
        model.fit(&index_series(values)?)?;
        let (alpha, beta, gamma) = match (model.alpha(), model.beta(), model.gamma()) {
            (Some(a), Some(b), Some(g)) => (a, b, g),
            _ => return Err(ForecastError::Model("no smoothing parameters after fit".into())),
        };

        let mut fitted = model
            .fitted_values()
            .map(<[f64]>::to_vec)
            .ok_or_else(|| ForecastError::Model("no fitted values after fit".into()))?;
        fitted.iter_mut().take(period).for_each(|v| *v = f64::NAN);

        let paths = (0..values.len())
            .map(|t| forecast_path(&values[..=t], period, alpha, beta, gamma))
            .collect();

        log::debug!(
            "Holt-Winters fit: n={} alpha={alpha:.4} beta={beta:.4} gamma={gamma:.4}",
            values.len()
        );
        Ok(HoltWintersFit {
            alpha,
            beta,
            gamma,
            fitted,
            paths,
        })
    }

    /// Forecast `h >= 1` steps after observation `origin`, or `None` when the
    /// origin precedes the second season, lies past the data, or `h` exceeds
    /// the stored horizon.
    pub fn forecast_from(&self, origin: usize, h: usize) -> Option<f64> {
        self.paths.get(origin)?.get(h.checked_sub(1)?).copied()
    }
}

/// Refit fixed parameters on `prefix` and forecast `MAX_HORIZON` steps.
fn forecast_path(prefix: &[f64], period: usize, alpha: f64, beta: f64, gamma: f64) -> Vec<f64> {
    if prefix.len() < 2 * period {
        return Vec::new();
    }
    let mut model = HoltWinters::additive(alpha, beta, gamma, period);
    let path = index_series(prefix).and_then(|series| {
        model.fit(&series)?;
        Ok(model.predict(MAX_HORIZON)?.primary().to_vec())
    });
    path.unwrap_or_else(|e| {
        log::warn!("Holt-Winters refit at origin {} failed: {e}", prefix.len() - 1);
        Vec::new()
    })
}

/// Positional values on a daily synthetic index; only the order matters.
fn index_series(values: &[f64]) -> Result<TimeSeries> {
    let timestamps = (0..values.len())
        .map(|i| DateTime::<Utc>::from_timestamp(i as i64 * 86_400, 0))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ForecastError::Model("time index out of range".into()))?;
    Ok(TimeSeries::univariate(timestamps, values.to_vec())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::baseline::naive;
    use crate::stats::metrics::rmse;
    use approx::assert_abs_diff_eq;

    fn seasonal(n: usize, trend: f64) -> Vec<f64> {
        (0..n)
            .map(|t| {
                let angle = 2.0 * std::f64::consts::PI * t as f64 / 12.0;
                50.0 + trend * t as f64 + 10.0 * angle.sin()
            })
            .collect()
    }

    #[test]
    fn pure_seasonal_series_is_tracked_exactly() {
        let y = seasonal(48, 0.0);
        let fit = HoltWintersFit::fit(&y, 12).unwrap();
        assert!(fit.fitted[..12].iter().all(|v| v.is_nan()));
        for t in 12..y.len() {
            assert!((fit.fitted[t] - y[t]).abs() < 1e-6, "t={t}");
        }
        assert!((fit.forecast_from(47, 3).unwrap() - y[2]).abs() < 1e-6);
    }

    #[test]
    fn beats_naive_on_trend_and_season() {
        let y = seasonal(96, 0.5);
        let fit = HoltWintersFit::fit(&y, 12).unwrap();
        for p in [fit.alpha, fit.beta, fit.gamma] {
            assert!(p > 0.0 && p < 1.0, "parameter {p}");
        }
        let tail = 24..y.len();
        let hw = rmse(&y[tail.clone()], &fit.fitted[tail.clone()]).unwrap();
        let nv = rmse(&y[tail.clone()], &naive(&y)[tail]).unwrap();
        assert!(hw < nv, "holt-winters {hw} vs naive {nv}");
    }

    #[test]
    fn short_or_gappy_series_is_rejected() {
        assert_eq!(
            HoltWintersFit::fit(&seasonal(20, 0.0), 12).unwrap_err(),
            ForecastError::InsufficientData { needed: 24, got: 20 }
        );
        let mut y = seasonal(30, 0.0);
        y[4] = f64::NAN;
        assert_eq!(HoltWintersFit::fit(&y, 12).unwrap_err(), ForecastError::MissingValues);
        assert_eq!(HoltWintersFit::fit(&[], 12).unwrap_err(), ForecastError::EmptyData);
    }

    #[test]
    fn forecast_origin_bounds() {
        let y = seasonal(36, 0.2);
        let fit = HoltWintersFit::fit(&y, 12).unwrap();
        assert!(fit.forecast_from(22, 1).is_none());
        assert!(fit.forecast_from(23, 1).is_some());
        assert!(fit.forecast_from(35, 12).is_some());
        assert!(fit.forecast_from(35, 13).is_none());
        assert!(fit.forecast_from(36, 1).is_none());
        assert!(fit.forecast_from(30, 0).is_none());
    }

    #[test]
    fn prefix_refit_matches_in_sample_filter() {
        let y = seasonal(40, 0.3);
        let fit = HoltWintersFit::fit(&y, 12).unwrap();
        for origin in 23..y.len() - 1 {
            let one_step = fit.forecast_from(origin, 1).unwrap();
            assert_abs_diff_eq!(one_step, fit.fitted[origin + 1], epsilon = 1e-9);
        }
    }
}
