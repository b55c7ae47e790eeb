//! Rolling-origin evaluation of the overlay models.

use std::rc::Rc;

use crate::data::model::TimeSeriesTable;
use crate::stats::metrics::{mae, rmse, Accuracy};

use super::{Model, ModelRun, Result};

/// Longest horizon shown on the performance panel.
pub const MAX_HORIZON: usize = 12;

/// Error of `h`-step-ahead forecasts over every usable origin.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonError {
    pub h: usize,
    pub mae: f64,
    pub rmse: f64,
    /// Number of origin/target pairs behind the figures.
    pub count: usize,
}

/// MAE and RMSE per horizon `1..=max_h`, forecasting from every origin that
/// leaves room for the target. Horizons with no usable pair carry `NaN`.
pub fn horizon_errors(run: &ModelRun, values: &[f64], max_h: usize) -> Vec<HorizonError> {
    (1..=max_h)
        .map(|h| {
            let (actual, predicted): (Vec<f64>, Vec<f64>) = (0..values.len().saturating_sub(h))
                .filter_map(|origin| {
                    let target = values[origin + h];
                    let forecast = run.forecast_from(origin, h)?;
                    (!target.is_nan()).then_some((target, forecast))
                })
                .unzip();
            HorizonError {
                h,
                mae: mae(&actual, &predicted).unwrap_or(f64::NAN),
                rmse: rmse(&actual, &predicted).unwrap_or(f64::NAN),
                count: actual.len(),
            }
        })
        .collect()
}

/// Average several horizon curves (one per series) point by point,
/// ignoring `NaN` entries. Counts are summed.
pub fn mean_curve(curves: &[Vec<HorizonError>]) -> Vec<HorizonError> {
    let max_h = curves.iter().map(Vec::len).max().unwrap_or(0);
    (0..max_h)
        .map(|i| {
            let at: Vec<&HorizonError> = curves.iter().filter_map(|c| c.get(i)).collect();
            let avg = |f: fn(&HorizonError) -> f64| {
                let finite: Vec<f64> = at.iter().map(|e| f(e)).filter(|v| v.is_finite()).collect();
                if finite.is_empty() {
                    f64::NAN
                } else {
                    finite.iter().sum::<f64>() / finite.len() as f64
                }
            };
            HorizonError {
                h: i + 1,
                mae: avg(|e| e.mae),
                rmse: avg(|e| e.rmse),
                count: at.iter().map(|e| e.count).sum(),
            }
        })
        .collect()
}

/// In-sample one-step residuals `actual - fitted`, where both are defined.
pub fn residuals(run: &ModelRun, values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .zip(&run.fitted)
        .map(|(a, f)| a - f)
        .filter(|r| !r.is_nan())
        .collect()
}

/// One line of the metrics table.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    pub series: String,
    pub model: Model,
    pub mae: f64,
    pub rmse: f64,
    pub mape: f64,
}

/// In-sample accuracy for every series × model pair, over the observed
/// values of each series in `table`. `fit` supplies the run for a pair and
/// pairs it cannot fit are left out.
pub fn metrics_table(
    table: &TimeSeriesTable,
    series: &[String],
    models: &[Model],
    mut fit: impl FnMut(&str, Model) -> Result<Rc<ModelRun>>,
) -> Vec<MetricsRow> {
    let mut rows = Vec::with_capacity(series.len() * models.len());
    for name in series {
        let values: Vec<f64> = table.series(name).into_iter().map(|(_, v)| v).collect();
        for &model in models {
            let run = match fit(name, model) {
                Ok(run) => run,
                Err(e) => {
                    log::debug!("metrics: skipping {} for {name}: {e}", model.label());
                    continue;
                }
            };
            rows.extend(metrics_row(name, &run, &values));
        }
    }
    rows
}

/// Accuracy of one fitted run against the values it was fitted on.
pub fn metrics_row(series: &str, run: &ModelRun, values: &[f64]) -> Option<MetricsRow> {
    let acc = Accuracy::compute(values, &run.fitted).ok()?;
    Some(MetricsRow {
        series: series.to_string(),
        model: run.model,
        mae: acc.mae,
        rmse: acc.rmse,
        mape: acc.mape,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn monthly_table(columns: Vec<(String, Vec<f64>)>, n: usize) -> TimeSeriesTable {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let dates = (0..n as u32)
            .map(|i| start.checked_add_months(chrono::Months::new(i)).unwrap())
            .collect();
        TimeSeriesTable::from_columns(dates, columns)
    }

    #[test]
    fn naive_error_grows_with_horizon_on_a_ramp() {
        let y: Vec<f64> = (0..30).map(|i| 2.0 * i as f64).collect();
        let run = ModelRun::fit(Model::Naive, &y).unwrap();
        let curve = horizon_errors(&run, &y, MAX_HORIZON);
        assert_eq!(curve.len(), MAX_HORIZON);
        for e in &curve {
            assert_relative_eq!(e.mae, 2.0 * e.h as f64);
            assert_relative_eq!(e.rmse, 2.0 * e.h as f64);
            assert_eq!(e.count, 30 - e.h);
        }
    }

    #[test]
    fn seasonal_naive_is_exact_on_periodic_data() {
        let y: Vec<f64> = (0..48).map(|i| (i % 12) as f64 * 10.0).collect();
        let run = ModelRun::fit(Model::SeasonalNaive, &y).unwrap();
        for e in horizon_errors(&run, &y, MAX_HORIZON) {
            assert_relative_eq!(e.mae, 0.0);
            assert_eq!(e.count, 48 - 12);
        }
        assert!(residuals(&run, &y).iter().all(|r| *r == 0.0));
        assert_eq!(residuals(&run, &y).len(), 36);
    }

    #[test]
    fn short_series_yield_nan_horizons() {
        let y = [1.0, 2.0];
        let run = ModelRun::fit(Model::Naive, &y).unwrap();
        let curve = horizon_errors(&run, &y, 3);
        assert_eq!(curve[0].count, 1);
        assert!(curve[1].mae.is_nan());
        assert_eq!(curve[2].count, 0);
    }

    #[test]
    fn mean_curve_skips_undefined_points() {
        let a = vec![
            HorizonError { h: 1, mae: 1.0, rmse: 2.0, count: 5 },
            HorizonError { h: 2, mae: f64::NAN, rmse: f64::NAN, count: 0 },
        ];
        let b = vec![
            HorizonError { h: 1, mae: 3.0, rmse: 4.0, count: 5 },
            HorizonError { h: 2, mae: 6.0, rmse: 8.0, count: 4 },
        ];
        let mean = mean_curve(&[a, b]);
        assert_eq!(mean.len(), 2);
        assert_relative_eq!(mean[0].mae, 2.0);
        assert_relative_eq!(mean[0].rmse, 3.0);
        assert_eq!(mean[0].count, 10);
        assert_relative_eq!(mean[1].mae, 6.0);
        assert!(mean_curve(&[]).is_empty());
    }

    #[test]
    fn metrics_table_covers_fittable_pairs() {
        let a: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let b: Vec<f64> = (0..30).map(|i| 50.0 + (i % 12) as f64).collect();
        let table = monthly_table(
            vec![("Regular_Imp".into(), a), ("Diesel_Imp".into(), b)],
            30,
        );
        let series = vec!["Regular_Imp".to_string(), "Diesel_Imp".to_string(), "Nope".to_string()];
        let rows = metrics_table(&table, &series, &[Model::Naive, Model::SeasonalNaive], |name, model| {
            let values: Vec<f64> = table.series(name).into_iter().map(|(_, v)| v).collect();
            ModelRun::fit(model, &values).map(Rc::new)
        });
        assert_eq!(rows.len(), 4);
        let naive_regular = &rows[0];
        assert_eq!(naive_regular.series, "Regular_Imp");
        assert_eq!(naive_regular.model, Model::Naive);
        assert_relative_eq!(naive_regular.mae, 1.0);
        assert_relative_eq!(naive_regular.rmse, 1.0);
        let snaive_diesel = &rows[3];
        assert_relative_eq!(snaive_diesel.mae, 0.0);
        for row in &rows {
            assert!(row.rmse >= row.mae);
        }
    }
}
