use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};

use super::model::{DATE_COLUMN, FUEL_SERIES, TimeSeriesTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a fuel time-series table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` – a `fecha` date column plus one numeric column per series
pub fn load_file(path: &Path) -> Result<TimeSeriesTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            load_csv_reader(file)
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one row per month.
///
/// ```text
/// fecha,Regular_Imp,Superior_Imp,Diesel_Imp,Regular_Con,Superior_Con,Diesel_Con
/// 2001-01-01,177776.5,373963.96,566101.99,202645.2,308156.82,634667.06
/// ```
///
/// A column counts as a series when every non-empty cell parses as a float.
/// Empty cells become `NaN`. Other columns are skipped. Header names must be
/// unique.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<TimeSeriesTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut seen = BTreeSet::new();
    if let Some(dup) = headers.iter().find(|h| !seen.insert(h.as_str())) {
        bail!("CSV has duplicate column '{dup}'");
    }

    let date_idx = headers
        .iter()
        .position(|h| h == DATE_COLUMN)
        .with_context(|| format!("CSV missing '{DATE_COLUMN}' column"))?;

    let mut dates = Vec::new();
    let mut cells: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];
    let mut numeric = vec![true; headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = parse_date(raw_date)
            .with_context(|| format!("CSV row {row_no}: '{raw_date}' is not a date"))?;
        dates.push(date);

        for (col_idx, column) in cells.iter_mut().enumerate() {
            if col_idx == date_idx {
                continue;
            }
            let value = record.get(col_idx).unwrap_or("");
            if value.is_empty() || value.eq_ignore_ascii_case("nan") {
                column.push(None);
            } else if let Ok(v) = value.parse::<f64>() {
                column.push(Some(v));
            } else {
                numeric[col_idx] = false;
                column.push(None);
            }
        }
    }

    if dates.is_empty() {
        bail!("CSV has no data rows");
    }

    let mut columns = Vec::new();
    for (col_idx, name) in headers.iter().enumerate() {
        if col_idx == date_idx {
            continue;
        }
        if !numeric[col_idx] {
            log::warn!("Skipping non-numeric column '{name}'");
            continue;
        }
        let values = cells[col_idx]
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        columns.push((name.clone(), values));
    }

    if columns.is_empty() {
        bail!("CSV has no numeric series columns");
    }
    for expected in FUEL_SERIES {
        if !columns.iter().any(|(name, _)| name == expected) {
            log::warn!("CSV has no '{expected}' series");
        }
    }

    Ok(TimeSeriesTable::from_columns(dates, columns))
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_series_and_sorts_rows() {
        let csv = "fecha,Regular_Imp,Diesel_Con,nota\n\
                   2020-02-01,2.5,,b\n\
                   2020-01-01,1.5,10,a\n";
        let table = load_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["Regular_Imp", "Diesel_Con"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.dates[0], NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(table.column("Regular_Imp").unwrap(), &[1.5, 2.5]);
        assert!(table.column("Diesel_Con").unwrap()[1].is_nan());
        assert!(table.column("nota").is_none());
    }

    #[test]
    fn accepts_datetime_and_day_first_dates() {
        assert_eq!(
            parse_date("2021-03-01 00:00:00"),
            NaiveDate::from_ymd_opt(2021, 3, 1)
        );
        assert_eq!(parse_date("15/04/2021"), NaiveDate::from_ymd_opt(2021, 4, 15));
        assert_eq!(parse_date("abril"), None);
    }

    #[test]
    fn rejects_missing_date_column() {
        let err = load_csv_reader("date,A\n2020-01-01,1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("fecha"));
    }

    #[test]
    fn rejects_duplicate_columns() {
        let csv = "fecha,Regular_Imp,Regular_Imp\n2020-01-01,1,2\n";
        let err = load_csv_reader(csv.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "CSV has duplicate column 'Regular_Imp'");

        let csv = "fecha,A,fecha\n2020-01-01,1,2020-02-01\n";
        assert!(load_csv_reader(csv.as_bytes()).unwrap_err().to_string().contains("'fecha'"));
    }

    #[test]
    fn rejects_bad_dates_and_empty_files() {
        let err = load_csv_reader("fecha,A\nayer,1\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("row 0"));
        assert!(load_csv_reader("fecha,A\n".as_bytes()).is_err());
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = load_file(Path::new("datos.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
