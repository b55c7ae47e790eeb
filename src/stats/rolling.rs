//! Rolling statistics and z-score anomaly flagging.

use chrono::NaiveDate;

/// Window lengths offered in the anomaly panel (months).
pub const WINDOW_OPTIONS: [usize; 3] = [3, 6, 12];

/// Trailing rolling mean and population standard deviation.
///
/// Index `i` covers `values[i + 1 - window ..= i]`. It is `NaN` until a full
/// window is available, and whenever the window contains a `NaN`.
pub fn rolling_mean_std(values: &[f64], window: usize) -> (Vec<f64>, Vec<f64>) {
    let n = values.len();
    let mut mean = vec![f64::NAN; n];
    let mut std = vec![f64::NAN; n];
    if window == 0 {
        return (mean, std);
    }

    for end in (window - 1)..n {
        let slice = &values[end + 1 - window..=end];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mu = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / window as f64;
        mean[end] = mu;
        std[end] = var.sqrt();
    }

    (mean, std)
}

/// One observation standardised against its trailing window.
#[derive(Debug, Clone, PartialEq)]
pub struct ZScorePoint {
    pub date: NaiveDate,
    pub value: f64,
    pub mean: f64,
    pub resid: f64,
    pub z: f64,
}

/// Z-scores of `points` against a trailing window. Points whose score is
/// undefined (short window or zero spread) are dropped.
pub fn zscores(points: &[(NaiveDate, f64)], window: usize) -> Vec<ZScorePoint> {
    let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
    let (mean, std) = rolling_mean_std(&values, window);

    points
        .iter()
        .zip(mean.iter().zip(&std))
        .filter_map(|(&(date, value), (&mu, &sd))| {
            let resid = value - mu;
            let z = resid / sd;
            z.is_finite().then_some(ZScorePoint {
                date,
                value,
                mean: mu,
                resid,
                z,
            })
        })
        .collect()
}

/// Points with `|z| >= threshold`.
pub fn flag_anomalies(points: &[ZScorePoint], threshold: f64) -> Vec<ZScorePoint> {
    points
        .iter()
        .filter(|p| p.z.abs() >= threshold)
        .cloned()
        .collect()
}

/// Row of the anomaly table.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyRow {
    pub date: NaiveDate,
    pub series: String,
    pub value: f64,
    pub mean: f64,
    pub resid: f64,
    pub z: f64,
}

/// Flag every series and merge the results, sorted by date then series.
pub fn anomaly_table(
    series: &[(String, Vec<(NaiveDate, f64)>)],
    window: usize,
    threshold: f64,
) -> Vec<AnomalyRow> {
    let mut rows: Vec<AnomalyRow> = series
        .iter()
        .flat_map(|(name, points)| {
            flag_anomalies(&zscores(points, window), threshold)
                .into_iter()
                .map(move |p| AnomalyRow {
                    date: p.date,
                    series: name.clone(),
                    value: p.value,
                    mean: p.mean,
                    resid: p.resid,
                    z: p.z,
                })
        })
        .collect();

    rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.series.cmp(&b.series)));
    rows
}

/// Sorted unique dates of the given rows.
pub fn unique_dates(rows: &[AnomalyRow]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
    dates.sort();
    dates.dedup();
    dates
}

/// Centred rolling mean with `min_periods = 1`; identity for `w <= 1`.
pub fn centered_smooth(values: &[f64], w: usize) -> Vec<f64> {
    if w <= 1 {
        return values.to_vec();
    }
    let n = values.len() as isize;
    // w/2 values before the centre, the rest after.
    let before = (w / 2) as isize;
    let after = w as isize - before - 1;
    (0..n)
        .map(|i| {
            let lo = (i - before).max(0) as usize;
            let hi = (i + after).min(n - 1) as usize;
            let window: Vec<f64> = values[lo..=hi].iter().copied().filter(|v| !v.is_nan()).collect();
            if window.is_empty() {
                f64::NAN
            } else {
                window.iter().sum::<f64>() / window.len() as f64
            }
        })
        .collect()
}

/// Expanding mean.
pub fn cumulative_mean(values: &[f64]) -> Vec<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    values
        .iter()
        .map(|&v| {
            if !v.is_nan() {
                sum += v;
                count += 1;
            }
            if count == 0 { f64::NAN } else { sum / count as f64 }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn monthly(values: &[f64]) -> Vec<(NaiveDate, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let date = NaiveDate::from_ymd_opt(2010 + (i / 12) as i32, (i % 12) as u32 + 1, 1)
                    .unwrap();
                (date, *v)
            })
            .collect()
    }

    fn wavy(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 10.0 + if i % 17 == 0 { 40.0 } else { 0.0 })
            .collect()
    }

    #[test]
    fn rolling_is_undefined_until_window_fills() {
        let values = wavy(40);
        for window in WINDOW_OPTIONS {
            let (mean, std) = rolling_mean_std(&values, window);
            for i in 0..values.len() {
                if i + 1 < window {
                    assert!(mean[i].is_nan() && std[i].is_nan(), "index {i}, window {window}");
                } else {
                    assert!(!mean[i].is_nan() && !std[i].is_nan(), "index {i}, window {window}");
                }
            }
        }
    }

    #[test]
    fn rolling_uses_population_std() {
        let (mean, std) = rolling_mean_std(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_relative_eq!(mean[1], 1.5);
        assert_relative_eq!(std[1], 0.5);
        assert_relative_eq!(mean[3], 3.5);
    }

    #[test]
    fn nan_in_window_propagates() {
        let (mean, _) = rolling_mean_std(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2);
        assert!(mean[1].is_nan() && mean[2].is_nan());
        assert_relative_eq!(mean[3], 3.5);
    }

    #[test]
    fn zscores_drop_undefined_points() {
        let points = monthly(&[5.0, 5.0, 5.0, 6.0]);
        let z = zscores(&points, 3);
        // index 2 has zero spread, so only index 3 survives
        assert_eq!(z.len(), 1);
        assert_eq!(z[0].date, points[3].0);
        assert_relative_eq!(z[0].resid, 6.0 - 16.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn flagged_set_shrinks_as_threshold_rises() {
        let points = monthly(&wavy(60));
        let z = zscores(&points, 6);
        let mut previous: Option<Vec<NaiveDate>> = None;
        for step in 5..=40 {
            let threshold = step as f64 / 10.0;
            let flagged: Vec<NaiveDate> =
                flag_anomalies(&z, threshold).iter().map(|p| p.date).collect();
            if let Some(prev) = &previous {
                assert!(flagged.iter().all(|d| prev.contains(d)), "threshold {threshold}");
            }
            previous = Some(flagged);
        }
    }

    #[test]
    fn anomaly_table_is_sorted_by_date_then_series() {
        let data = wavy(48);
        let series = vec![
            ("Superior_Imp".to_string(), monthly(&data)),
            ("Diesel_Imp".to_string(), monthly(&data)),
        ];
        let rows = anomaly_table(&series, 12, 1.0);
        assert!(!rows.is_empty());
        for pair in rows.windows(2) {
            assert!((pair[0].date, &pair[0].series) <= (pair[1].date, &pair[1].series));
        }
        let dates = unique_dates(&rows);
        assert_eq!(dates.len() * 2, rows.len());
    }

    #[test]
    fn smoothing_and_cumulative_mean() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(centered_smooth(&values, 1), values.to_vec());
        let smooth = centered_smooth(&values, 3);
        assert_relative_eq!(smooth[0], 1.5);
        assert_relative_eq!(smooth[2], 3.0);
        assert_relative_eq!(smooth[4], 4.5);
        assert_eq!(cumulative_mean(&values), vec![1.0, 1.5, 2.0, 2.5, 3.0]);
    }
}
