use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while fitting the overlay models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the model.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Failure reported by the forecasting backend.
    #[error("model error: {0}")]
    Model(String),

    /// Model compiled out of this build.
    #[error("model not available in this build: {0}")]
    Unavailable(&'static str),
}

#[cfg(feature = "holt-winters")]
impl From<anofox_forecast::ForecastError> for ForecastError {
    fn from(err: anofox_forecast::ForecastError) -> Self {
        use anofox_forecast::ForecastError as Backend;
        match err {
            Backend::EmptyData => ForecastError::EmptyData,
            Backend::InsufficientData { needed, got } => ForecastError::InsufficientData { needed, got },
            Backend::MissingValues => ForecastError::MissingValues,
            other => ForecastError::Model(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ForecastError::InsufficientData { needed: 24, got: 5 };
        assert_eq!(err.to_string(), "insufficient data: need at least 24, got 5");
        assert_eq!(
            ForecastError::Unavailable("Holt-Winters").to_string(),
            "model not available in this build: Holt-Winters"
        );
    }

    #[cfg(feature = "holt-winters")]
    #[test]
    fn backend_errors_keep_their_meaning() {
        let err: ForecastError = anofox_forecast::ForecastError::InsufficientData { needed: 24, got: 3 }.into();
        assert_eq!(err, ForecastError::InsufficientData { needed: 24, got: 3 });
        let err: ForecastError = anofox_forecast::ForecastError::FitRequired.into();
        assert!(matches!(err, ForecastError::Model(_)));
    }
}
