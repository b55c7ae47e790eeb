use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::model::TimeSeriesTable;

// ---------------------------------------------------------------------------
// Date range selection
// ---------------------------------------------------------------------------

/// Inclusive date interval chosen in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// The whole span of the table, if it has rows.
    pub fn full(table: &TimeSeriesTable) -> Option<Self> {
        table.date_bounds().map(|(s, e)| DateRange::new(s, e))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Keep both ends inside `bounds` and make sure `start <= end`.
    pub fn clamp_to(&self, bounds: (NaiveDate, NaiveDate)) -> Self {
        let (lo, hi) = bounds;
        let start = self.start.clamp(lo, hi);
        let end = self.end.clamp(lo, hi);
        if start <= end {
            DateRange::new(start, end)
        } else {
            DateRange::new(end, start)
        }
    }
}

// ---------------------------------------------------------------------------
// Epoch cut
// ---------------------------------------------------------------------------

/// Coarse time cut applied before resampling in the trend panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Epoch {
    #[default]
    All,
    Pre2020,
    Post2020,
}

impl Epoch {
    pub const ALL: [Epoch; 3] = [Epoch::All, Epoch::Pre2020, Epoch::Post2020];

    pub fn label(&self) -> &'static str {
        match self {
            Epoch::All => "Todo",
            Epoch::Pre2020 => "Pre-2020",
            Epoch::Post2020 => "Post-2020",
        }
    }

    fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn keeps(&self, date: NaiveDate) -> bool {
        match self {
            Epoch::All => true,
            Epoch::Pre2020 => date < Self::cutoff(),
            Epoch::Post2020 => date >= Self::cutoff(),
        }
    }

    pub fn apply(&self, table: &TimeSeriesTable) -> TimeSeriesTable {
        match self {
            Epoch::All => table.clone(),
            _ => table.filter_rows(|d| self.keeps(d)),
        }
    }
}

// ---------------------------------------------------------------------------
// Resampling
// ---------------------------------------------------------------------------

/// Aggregation frequency of the trend panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Monthly, Frequency::Quarterly, Frequency::Yearly];

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Monthly => "Mensual",
            Frequency::Quarterly => "Trimestral",
            Frequency::Yearly => "Anual",
        }
    }

    /// First day of the period containing `date`.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        let month = match self {
            Frequency::Monthly => date.month(),
            Frequency::Quarterly => (date.month() - 1) / 3 * 3 + 1,
            Frequency::Yearly => 1,
        };
        NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
    }

    /// Start of the period following the one that starts at `start`.
    fn next_start(&self, start: NaiveDate) -> NaiveDate {
        let step = match self {
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::Yearly => 12,
        };
        let months = start.year() * 12 + start.month0() as i32 + step;
        NaiveDate::from_ymd_opt(months.div_euclid(12), months.rem_euclid(12) as u32 + 1, 1)
            .unwrap_or(start)
    }
}

/// Sum every column per period. Rows are dated at the period start and
/// empty periods between the first and last one are filled with zeros.
pub fn resample(table: &TimeSeriesTable, freq: Frequency) -> TimeSeriesTable {
    let Some((first, last)) = table.date_bounds() else {
        return table.clone();
    };

    let mut starts = Vec::new();
    let mut cursor = freq.period_start(first);
    let last_start = freq.period_start(last);
    while cursor <= last_start {
        starts.push(cursor);
        let next = freq.next_start(cursor);
        if next <= cursor {
            break;
        }
        cursor = next;
    }
    let slot: BTreeMap<NaiveDate, usize> =
        starts.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let columns = table
        .columns
        .iter()
        .map(|name| {
            let mut sums = vec![0.0; starts.len()];
            if let Some(col) = table.column(name) {
                for (date, v) in table.dates.iter().zip(col) {
                    if v.is_nan() {
                        continue;
                    }
                    if let Some(&i) = slot.get(&freq.period_start(*date)) {
                        sums[i] += v;
                    }
                }
            }
            (name.clone(), sums)
        })
        .collect();

    TimeSeriesTable::from_columns(starts, columns)
}

// ---------------------------------------------------------------------------
// Categorical periods for the stacked bars
// ---------------------------------------------------------------------------

/// Category used on the x axis of the stacked bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PeriodKind {
    #[default]
    Year,
    Quarter,
}

impl PeriodKind {
    pub const ALL: [PeriodKind; 2] = [PeriodKind::Year, PeriodKind::Quarter];

    pub fn label(&self) -> &'static str {
        match self {
            PeriodKind::Year => "Año",
            PeriodKind::Quarter => "Trimestre",
        }
    }
}

/// `"2019"` for years, `"2019Q3"` for quarters.
pub fn period_label(date: NaiveDate, kind: PeriodKind) -> String {
    match kind {
        PeriodKind::Year => date.year().to_string(),
        PeriodKind::Quarter => format!("{}Q{}", date.year(), (date.month() - 1) / 3 + 1),
    }
}

/// Per-period sums of a set of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTotals {
    pub label: String,
    /// One total per requested column, in the same order.
    pub totals: Vec<f64>,
}

impl PeriodTotals {
    pub fn sum(&self) -> f64 {
        self.totals.iter().sum()
    }
}

/// Sum `columns` by year or quarter, in chronological order. Missing cells
/// count as zero.
pub fn group_by_period(
    table: &TimeSeriesTable,
    columns: &[String],
    kind: PeriodKind,
) -> Vec<PeriodTotals> {
    // Keyed by (year, quarter) so ordering is chronological.
    let mut groups: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for (row, date) in table.dates.iter().enumerate() {
        let key = match kind {
            PeriodKind::Year => (date.year(), 0),
            PeriodKind::Quarter => (date.year(), (date.month() - 1) / 3 + 1),
        };
        let totals = groups.entry(key).or_insert_with(|| vec![0.0; columns.len()]);
        for (i, name) in columns.iter().enumerate() {
            let v = table.column(name).map(|c| c[row]).unwrap_or(f64::NAN);
            if !v.is_nan() {
                totals[i] += v;
            }
        }
    }

    groups
        .into_iter()
        .map(|((year, quarter), totals)| {
            let month = quarter.max(1) * 3 - 2;
            let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN);
            PeriodTotals {
                label: period_label(start, kind),
                totals,
            }
        })
        .collect()
}

/// Convert totals to percentage shares of each period's sum. Periods whose
/// sum is not positive become all zeros.
pub fn to_shares(periods: &[PeriodTotals]) -> Vec<PeriodTotals> {
    periods
        .iter()
        .map(|p| {
            let total = p.sum();
            let totals = p
                .totals
                .iter()
                .map(|v| if total > 0.0 { v / total * 100.0 } else { 0.0 })
                .collect();
            PeriodTotals {
                label: p.label.clone(),
                totals,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Month × year pivot
// ---------------------------------------------------------------------------

/// Monthly means of one series laid out as `cells[month - 1][year_index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthYearGrid {
    pub years: Vec<i32>,
    /// 12 rows (January..December), one column per year; `NaN` where empty.
    pub cells: Vec<Vec<f64>>,
}

impl MonthYearGrid {
    /// Finite `(min, max)` over all cells.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Pivot `column` to month × year using the mean of each cell. `None` when
/// the column has no observations.
pub fn month_year_pivot(table: &TimeSeriesTable, column: &str) -> Option<MonthYearGrid> {
    let values = table.column(column)?;
    let mut sums: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for (date, &v) in table.dates.iter().zip(values) {
        if v.is_nan() {
            continue;
        }
        let cell = sums.entry((date.year(), date.month())).or_insert((0.0, 0));
        cell.0 += v;
        cell.1 += 1;
    }
    if sums.is_empty() {
        return None;
    }

    let mut years: Vec<i32> = sums.keys().map(|(y, _)| *y).collect();
    years.dedup();
    let mut cells = vec![vec![f64::NAN; years.len()]; 12];
    for ((year, month), (sum, count)) in sums {
        if let Ok(col) = years.binary_search(&year) {
            cells[month as usize - 1][col] = sum / count as f64;
        }
    }
    Some(MonthYearGrid { years, cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn monthly_table(n: usize) -> TimeSeriesTable {
        let dates: Vec<NaiveDate> = (0..n)
            .map(|i| NaiveDate::from_ymd_opt(2018 + (i / 12) as i32, (i % 12) as u32 + 1, 1).unwrap())
            .collect();
        let a: Vec<f64> = (0..n).map(|i| i as f64 + 1.0).collect();
        let b: Vec<f64> = (0..n)
            .map(|i| if i % 5 == 0 { f64::NAN } else { 10.0 })
            .collect();
        TimeSeriesTable::from_columns(dates, vec![("A_Imp".into(), a), ("B_Con".into(), b)])
    }

    fn nan_sum(xs: &[f64]) -> f64 {
        xs.iter().filter(|v| !v.is_nan()).sum()
    }

    #[test]
    fn clamp_orders_and_bounds_the_range() {
        let lo = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        let hi = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let r = DateRange::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), lo)
            .clamp_to((lo, hi));
        assert_eq!(r, DateRange::new(lo, hi));
    }

    #[test]
    fn epoch_cuts_at_2020() {
        let table = monthly_table(36); // 2018..=2020
        assert_eq!(Epoch::Pre2020.apply(&table).len(), 24);
        assert_eq!(Epoch::Post2020.apply(&table).len(), 12);
        assert_eq!(Epoch::All.apply(&table).len(), 36);
    }

    #[test]
    fn resampling_preserves_totals() {
        let table = monthly_table(30);
        for freq in Frequency::ALL {
            let agg = resample(&table, freq);
            for name in &table.columns {
                assert_relative_eq!(
                    nan_sum(agg.column(name).unwrap()),
                    nan_sum(table.column(name).unwrap()),
                    epsilon = 1e-9
                );
            }
        }
        assert_eq!(resample(&table, Frequency::Quarterly).len(), 10);
        assert_eq!(resample(&table, Frequency::Yearly).len(), 3);
    }

    #[test]
    fn resampling_fills_gaps_with_zero() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
        ];
        let table = TimeSeriesTable::from_columns(dates, vec![("A".into(), vec![1.0, 2.0])]);
        let agg = resample(&table, Frequency::Monthly);
        assert_eq!(agg.column("A").unwrap(), &[1.0, 0.0, 0.0, 2.0]);
        assert_eq!(agg.dates[0], NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }

    #[test]
    fn period_grouping_preserves_totals_and_order() {
        let table = monthly_table(30);
        let cols = table.columns.clone();
        for kind in PeriodKind::ALL {
            let groups = group_by_period(&table, &cols, kind);
            for (i, name) in cols.iter().enumerate() {
                let grouped: f64 = groups.iter().map(|g| g.totals[i]).sum();
                assert_relative_eq!(grouped, nan_sum(table.column(name).unwrap()), epsilon = 1e-9);
            }
        }
        let quarters = group_by_period(&table, &cols, PeriodKind::Quarter);
        assert_eq!(quarters.first().unwrap().label, "2018Q1");
        assert_eq!(quarters.last().unwrap().label, "2020Q2");
        let years = group_by_period(&table, &cols, PeriodKind::Year);
        let labels: Vec<&str> = years.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["2018", "2019", "2020"]);
    }

    #[test]
    fn period_labels() {
        let date = NaiveDate::from_ymd_opt(2019, 8, 1).unwrap();
        assert_eq!(period_label(date, PeriodKind::Year), "2019");
        assert_eq!(period_label(date, PeriodKind::Quarter), "2019Q3");
    }

    #[test]
    fn shares_sum_to_one_hundred() {
        let periods = vec![
            PeriodTotals { label: "2019".into(), totals: vec![1.0, 3.0] },
            PeriodTotals { label: "2020".into(), totals: vec![0.0, 0.0] },
        ];
        let shares = to_shares(&periods);
        assert_relative_eq!(shares[0].sum(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(shares[0].totals[0], 25.0, epsilon = 1e-9);
        assert_eq!(shares[1].totals, vec![0.0, 0.0]);
    }

    #[test]
    fn pivot_is_twelve_months_by_years() {
        let table = monthly_table(30);
        let grid = month_year_pivot(&table, "A_Imp").unwrap();
        assert_eq!(grid.years, vec![2018, 2019, 2020]);
        assert_eq!(grid.cells.len(), 12);
        assert!(grid.cells.iter().all(|row| row.len() == 3));
        assert_eq!(grid.cells[0][0], 1.0);
        assert_eq!(grid.cells[5][2], 30.0);
        assert!(grid.cells[6][2].is_nan());
        assert_eq!(grid.value_range(), Some((1.0, 30.0)));
        assert!(month_year_pivot(&table, "missing").is_none());
    }
}
