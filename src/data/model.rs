use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::filter::DateRange;

/// Series expected in the canonical fuel CSV, in display order.
pub const FUEL_SERIES: [&str; 6] = [
    "Regular_Imp",
    "Superior_Imp",
    "Diesel_Imp",
    "Regular_Con",
    "Superior_Con",
    "Diesel_Con",
];

/// Name of the date column.
pub const DATE_COLUMN: &str = "fecha";

// ---------------------------------------------------------------------------
// Series naming: "<Base>_<Flow>"
// ---------------------------------------------------------------------------

/// Import or consumption, taken from the column suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Import,
    Consumption,
    Other,
}

/// Fuel base of a column name (`Regular_Imp` → `Regular`).
pub fn base_of(column: &str) -> &str {
    column.split_once('_').map(|(base, _)| base).unwrap_or(column)
}

/// Flow of a column name (`*_Imp` → Import, `*_Con` → Consumption).
pub fn flow_of(column: &str) -> Flow {
    match column.split_once('_') {
        Some((_, suffix)) if suffix.to_ascii_lowercase().starts_with("con") => Flow::Consumption,
        Some((_, suffix)) if suffix.to_ascii_lowercase().starts_with("imp") => Flow::Import,
        _ => Flow::Other,
    }
}

// ---------------------------------------------------------------------------
// TimeSeriesTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Date-indexed table of numeric series. Rows are sorted by date and missing
/// cells are `NaN`.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesTable {
    /// Row index.
    pub dates: Vec<NaiveDate>,
    /// Series names in header order.
    pub columns: Vec<String>,
    /// column name → values, one per row.
    values: BTreeMap<String, Vec<f64>>,
}

impl TimeSeriesTable {
    /// Build a table from unsorted rows. Every column vector must have the
    /// same length as `dates`.
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Self {
        let mut order: Vec<usize> = (0..dates.len()).collect();
        order.sort_by_key(|&i| dates[i]);

        let sorted_dates = order.iter().map(|&i| dates[i]).collect();
        let mut names = Vec::with_capacity(columns.len());
        let mut values = BTreeMap::new();
        for (name, col) in columns {
            debug_assert_eq!(col.len(), dates.len());
            let sorted: Vec<f64> = order
                .iter()
                .map(|&i| col.get(i).copied().unwrap_or(f64::NAN))
                .collect();
            names.push(name.clone());
            values.insert(name, sorted);
        }

        TimeSeriesTable {
            dates: sorted_dates,
            columns: names,
            values,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Values of one column, aligned with `dates`.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// First and last date, if any.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }

    /// Rows whose date falls inside `range` (inclusive).
    pub fn slice(&self, range: &DateRange) -> TimeSeriesTable {
        self.filter_rows(|d| range.contains(d))
    }

    /// Rows for which `keep` returns true.
    pub fn filter_rows(&self, keep: impl Fn(NaiveDate) -> bool) -> TimeSeriesTable {
        let idx: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(_, d)| keep(**d))
            .map(|(i, _)| i)
            .collect();

        let values = self
            .values
            .iter()
            .map(|(name, col)| (name.clone(), idx.iter().map(|&i| col[i]).collect()))
            .collect();

        TimeSeriesTable {
            dates: idx.iter().map(|&i| self.dates[i]).collect(),
            columns: self.columns.clone(),
            values,
        }
    }

    /// Non-missing observations of one column as `(date, value)` pairs.
    pub fn series(&self, name: &str) -> Vec<(NaiveDate, f64)> {
        let Some(col) = self.values.get(name) else {
            return Vec::new();
        };
        self.dates
            .iter()
            .zip(col)
            .filter(|(_, v)| !v.is_nan())
            .map(|(d, v)| (*d, *v))
            .collect()
    }

    /// Whether every cell of the given columns is missing.
    pub fn all_missing(&self, names: &[String]) -> bool {
        names.iter().all(|n| {
            self.values
                .get(n)
                .map(|col| col.iter().all(|v| v.is_nan()))
                .unwrap_or(true)
        })
    }
}
