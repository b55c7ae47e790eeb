//! In-sample model overlays: naive, seasonal-naive and Holt-Winters.

pub mod baseline;
pub mod error;
pub mod evaluate;
#[cfg(feature = "holt-winters")]
pub mod holt_winters;

use serde::{Deserialize, Serialize};

pub use error::{ForecastError, Result};
#[cfg(feature = "holt-winters")]
use holt_winters::HoltWintersFit;

/// Season length for monthly data.
pub const SEASON: usize = 12;

/// Overlay models offered by the comparison views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Model {
    Naive,
    SeasonalNaive,
    HoltWinters,
}

impl Model {
    pub const ALL: [Model; 3] = [Model::Naive, Model::SeasonalNaive, Model::HoltWinters];

    pub fn label(&self) -> &'static str {
        match self {
            Model::Naive => "Naive",
            Model::SeasonalNaive => "S-Naive(12)",
            Model::HoltWinters => "Holt-Winters",
        }
    }

    /// Models compiled into this build.
    pub fn available() -> Vec<Model> {
        Model::ALL
            .into_iter()
            .filter(|m| *m != Model::HoltWinters || cfg!(feature = "holt-winters"))
            .collect()
    }
}

/// A model run over one series: the fitted values plus whatever is needed
/// to forecast from an arbitrary origin.
#[derive(Debug, Clone)]
pub struct ModelRun {
    pub model: Model,
    /// One-step-ahead in-sample predictions aligned with the input.
    pub fitted: Vec<f64>,
    values: Vec<f64>,
    #[cfg(feature = "holt-winters")]
    hw: Option<HoltWintersFit>,
}

impl ModelRun {
    pub fn fit(model: Model, values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        let run = match model {
            Model::Naive => Self::plain(model, baseline::naive(values), values),
            Model::SeasonalNaive => {
                Self::plain(model, baseline::seasonal_naive(values, SEASON), values)
            }
            #[cfg(feature = "holt-winters")]
            Model::HoltWinters => {
                let fit = HoltWintersFit::fit(values, SEASON)?;
                ModelRun {
                    model,
                    fitted: fit.fitted.clone(),
                    values: values.to_vec(),
                    hw: Some(fit),
                }
            }
            #[cfg(not(feature = "holt-winters"))]
            Model::HoltWinters => return Err(ForecastError::Unavailable("Holt-Winters")),
        };
        Ok(run)
    }

    fn plain(model: Model, fitted: Vec<f64>, values: &[f64]) -> Self {
        ModelRun {
            model,
            fitted,
            values: values.to_vec(),
            #[cfg(feature = "holt-winters")]
            hw: None,
        }
    }

    /// Prediction of `values[origin + h]` using only observations up to
    /// `origin`, or `None` when the model has no forecast there.
    pub fn forecast_from(&self, origin: usize, h: usize) -> Option<f64> {
        if h == 0 || origin >= self.values.len() {
            return None;
        }
        let value = match self.model {
            Model::Naive => self.values[origin],
            Model::SeasonalNaive => {
                let cycles = h.div_ceil(SEASON);
                let idx = (origin + h).checked_sub(cycles * SEASON)?;
                self.values[idx]
            }
            Model::HoltWinters => self.forecast_holt_winters(origin, h)?,
        };
        (!value.is_nan()).then_some(value)
    }

    /// Estimated `(α, β, γ)` of a Holt-Winters run.
    #[cfg(feature = "holt-winters")]
    pub fn smoothing_params(&self) -> Option<(f64, f64, f64)> {
        self.hw.as_ref().map(|fit| (fit.alpha, fit.beta, fit.gamma))
    }

    #[cfg(not(feature = "holt-winters"))]
    pub fn smoothing_params(&self) -> Option<(f64, f64, f64)> {
        None
    }

    #[cfg(feature = "holt-winters")]
    fn forecast_holt_winters(&self, origin: usize, h: usize) -> Option<f64> {
        self.hw.as_ref()?.forecast_from(origin, h)
    }

    #[cfg(not(feature = "holt-winters"))]
    fn forecast_holt_winters(&self, _origin: usize, _h: usize) -> Option<f64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_availability() {
        assert_eq!(Model::SeasonalNaive.label(), "S-Naive(12)");
        let available = Model::available();
        assert!(available.contains(&Model::Naive));
        assert_eq!(
            available.contains(&Model::HoltWinters),
            cfg!(feature = "holt-winters")
        );
    }

    #[test]
    fn seasonal_naive_forecast_reaches_back_whole_cycles() {
        let y: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let run = ModelRun::fit(Model::SeasonalNaive, &y).unwrap();
        assert_eq!(run.forecast_from(20, 1), Some(9.0));
        assert_eq!(run.forecast_from(20, 12), Some(20.0));
        assert_eq!(run.forecast_from(20, 13), Some(9.0));
        assert_eq!(run.forecast_from(5, 1), None);
    }

    #[test]
    fn naive_forecast_is_flat() {
        let y = [3.0, 5.0, 8.0];
        let run = ModelRun::fit(Model::Naive, &y).unwrap();
        assert_eq!(run.forecast_from(1, 1), Some(5.0));
        assert_eq!(run.forecast_from(1, 7), Some(5.0));
        assert_eq!(run.forecast_from(3, 1), None);
        assert_eq!(
            ModelRun::fit(Model::Naive, &[]).err(),
            Some(ForecastError::EmptyData)
        );
    }

    #[cfg(not(feature = "holt-winters"))]
    #[test]
    fn holt_winters_is_unavailable_without_feature() {
        assert_eq!(
            ModelRun::fit(Model::HoltWinters, &[1.0; 30]).err(),
            Some(ForecastError::Unavailable("Holt-Winters"))
        );
    }
}
