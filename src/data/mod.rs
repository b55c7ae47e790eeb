/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///   .csv (fecha + series columns)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → TimeSeriesTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ TimeSeriesTable │  dates, column order, values per column
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date range, epoch, resampling, period totals
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
