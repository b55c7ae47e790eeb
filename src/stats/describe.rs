//! Distribution summaries used by the box, violin and residual panels.

use statrs::statistics::{Data, OrderStatistics, Statistics};

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    /// Points outside the whiskers.
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// Summarise the non-`NaN` values, or `None` if there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if clean.is_empty() {
            return None;
        }
        clean.sort_by(|a, b| a.total_cmp(b));

        let mut data = Data::new(clean.clone());
        let q1 = data.lower_quartile();
        let median = data.median();
        let q3 = data.upper_quartile();
        let iqr = q3 - q1;
        let lo_fence = q1 - 1.5 * iqr;
        let hi_fence = q3 + 1.5 * iqr;

        let lower_whisker = clean.iter().copied().find(|&v| v >= lo_fence).unwrap_or(q1);
        let upper_whisker = clean.iter().rev().copied().find(|&v| v <= hi_fence).unwrap_or(q3);
        let outliers = clean
            .into_iter()
            .filter(|&v| v < lower_whisker || v > upper_whisker)
            .collect();

        Some(BoxSummary {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }
}

/// Gaussian kernel density on `points` evenly spaced samples, using
/// Scott's bandwidth. Returns `(x, density)` pairs, or `None` when the data
/// has fewer than two distinct values.
pub fn gaussian_kde(values: &[f64], points: usize) -> Option<Vec<(f64, f64)>> {
    let clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let n = clean.len();
    if n < 2 || points < 2 {
        return None;
    }
    let sd = clean.iter().std_dev();
    if !(sd > 0.0) {
        return None;
    }
    let bandwidth = sd * (n as f64).powf(-0.2);
    let min = clean.iter().copied().fold(f64::INFINITY, f64::min) - 3.0 * bandwidth;
    let max = clean.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 3.0 * bandwidth;
    let step = (max - min) / (points - 1) as f64;
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    Some(
        (0..points)
            .map(|i| {
                let x = min + i as f64 * step;
                let density = clean
                    .iter()
                    .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                    .sum::<f64>()
                    * norm;
                (x, density)
            })
            .collect(),
    )
}

/// Equal-width histogram as `(left, right, count)` bins.
pub fn histogram(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    let clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if clean.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = clean.iter().copied().fold(f64::INFINITY, f64::min);
    let max = clean.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

    let mut counts = vec![0usize; bins];
    for v in &clean {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (min + i as f64 * width, min + (i + 1) as f64 * width, c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn box_summary_flags_outliers() {
        let mut values: Vec<f64> = (1..=20).map(|v| v as f64).collect();
        values.push(500.0);
        values.push(f64::NAN);
        let summary = BoxSummary::from_values(&values).unwrap();
        assert!(summary.q1 < summary.median && summary.median < summary.q3);
        assert_eq!(summary.outliers, vec![500.0]);
        assert_eq!(summary.upper_whisker, 20.0);
        assert_eq!(summary.lower_whisker, 1.0);
        assert!(BoxSummary::from_values(&[f64::NAN]).is_none());
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let values: Vec<f64> = (0..200).map(|i| ((i * 37) % 101) as f64).collect();
        let curve = gaussian_kde(&values, 512).unwrap();
        let step = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|(_, d)| d * step).sum();
        assert_relative_eq!(area, 1.0, epsilon = 0.01);
        assert!(gaussian_kde(&[3.0, 3.0, 3.0], 64).is_none());
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|v| v as f64).collect();
        let bins = histogram(&values, 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.2).sum::<usize>(), 100);
        assert!(bins.iter().all(|b| b.2 == 10));
        assert_eq!(histogram(&[7.0], 4).iter().map(|b| b.2).sum::<usize>(), 1);
    }
}
