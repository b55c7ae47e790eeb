//! Statistics helpers shared by the chart panels.

pub mod describe;
pub mod metrics;
pub mod rolling;

use thiserror::Error;

/// Errors from the statistics helpers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Paired inputs of different length.
    #[error("length mismatch: {actual} actual values vs {predicted} predictions")]
    LengthMismatch { actual: usize, predicted: usize },
}
