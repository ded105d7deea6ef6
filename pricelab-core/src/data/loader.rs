//! Series Loader: CSV text in, validated date-ordered [`Series`] out.
//!
//! Structural problems (schema, bad cell, no rows) abort the load; there is
//! no partial result. OHLC sanity violations are only reported as warnings.
//!
//! Prices must be finite and non-negative. Zero is accepted; the returns
//! engine flags the day after a zero close instead of failing the load.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::data::schema::{ColumnMap, SchemaError};
use crate::domain::{PricePoint, Series};

/// Errors from loading a price file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("row {row}, column '{column}': cannot parse '{value}' ({reason})")]
    Parse {
        /// 1-based data row number (header excluded).
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("input contains no data rows")]
    EmptySeries,

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// A loaded series plus what the loader observed along the way.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: Series,
    /// Header cells exactly as found (trimmed).
    pub columns: Vec<String>,
    /// Data-quality findings that did not prevent loading.
    pub warnings: Vec<String>,
    /// True if rows were not already in ascending date order.
    pub reordered: bool,
}

/// CSV loader for daily OHLCV files.
#[derive(Debug, Clone, Default)]
pub struct SeriesLoader;

impl SeriesLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load from CSV text.
    pub fn load(&self, text: &str) -> Result<LoadedSeries, LoadError> {
        self.load_reader(text.as_bytes())
    }

    /// Load from a CSV file on disk.
    pub fn load_path(&self, path: &Path) -> Result<LoadedSeries, LoadError> {
        let file = std::fs::File::open(path)?;
        self.load_reader(file)
    }

    /// Load from any reader producing CSV bytes.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<LoadedSeries, LoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let map = ColumnMap::resolve(&columns)?;

        let mut points = Vec::new();
        let mut warnings = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let row = i + 1;
            let point = parse_row(&record, &map, row)?;
            if let Some(issue) = point.sanity_issue() {
                warnings.push(format!("row {row} ({}): {issue}", point.date));
            }
            points.push(point);
        }

        if points.is_empty() {
            return Err(LoadError::EmptySeries);
        }

        let reordered = points.windows(2).any(|w| w[1].date < w[0].date);
        if reordered {
            tracing::warn!(rows = points.len(), "input rows out of date order; sorting");
        }
        for warning in &warnings {
            tracing::warn!("data quality: {warning}");
        }

        let series = Series::from_unsorted(points).map_err(|_| LoadError::EmptySeries)?;
        tracing::debug!(
            rows = series.len(),
            start = %series.first().date,
            end = %series.last().date,
            "loaded price series"
        );

        Ok(LoadedSeries {
            series,
            columns,
            warnings,
            reordered,
        })
    }
}

/// Parse CSV text into a [`Series`], discarding loader diagnostics.
pub fn load_series(text: &str) -> Result<Series, LoadError> {
    SeriesLoader::new().load(text).map(|loaded| loaded.series)
}

fn parse_row(record: &csv::StringRecord, map: &ColumnMap, row: usize) -> Result<PricePoint, LoadError> {
    let cell = |index: usize| record.get(index).unwrap_or("");
    let fail = |column: &str, value: &str, reason: &str| LoadError::Parse {
        row,
        column: column.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let raw_date = cell(map.date);
    let date = parse_date(raw_date).ok_or_else(|| fail("date", raw_date, "unrecognized date"))?;

    let price = |column: &str, index: usize| {
        let raw = cell(index);
        parse_price(raw).map_err(|reason| fail(column, raw, reason))
    };
    let open = price("open", map.open)?;
    let high = price("high", map.high)?;
    let low = price("low", map.low)?;
    let close = price("close", map.close)?;

    let raw_volume = cell(map.volume);
    let volume = parse_volume(raw_volume).map_err(|reason| fail("volume", raw_volume, reason))?;

    Ok(PricePoint {
        date,
        open,
        high,
        low,
        close,
        volume,
    })
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a calendar date, accepting a trailing time-of-day component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw
        .trim()
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or("");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn parse_price(raw: &str) -> Result<f64, &'static str> {
    if raw.is_empty() {
        return Err("empty cell");
    }
    let value: f64 = raw.parse().map_err(|_| "not a number")?;
    if !value.is_finite() {
        return Err("not a finite number");
    }
    if value < 0.0 {
        return Err("negative price");
    }
    Ok(value)
}

fn parse_volume(raw: &str) -> Result<u64, &'static str> {
    if raw.is_empty() {
        return Err("empty cell");
    }
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(v);
    }
    let value: f64 = raw.parse().map_err(|_| "not an integer")?;
    if !value.is_finite() || value < 0.0 {
        return Err("not a non-negative integer");
    }
    if value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err("not an integer");
    }
    Ok(value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "date,open,high,low,close,volume\n";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn loads_simple_file() {
        let text = format!("{HEADER}2023-01-02,100,101,99,100.5,1000\n2023-01-03,100.5,102,100,101,1100\n");
        let loaded = SeriesLoader::new().load(&text).unwrap();
        assert_eq!(loaded.series.len(), 2);
        assert_eq!(loaded.series.closes(), vec![100.5, 101.0]);
        assert_eq!(loaded.series.points()[1].volume, 1100);
        assert!(!loaded.reordered);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn sorts_out_of_order_rows() {
        let text = format!(
            "{HEADER}2023-01-04,1,1,1,3,1\n2023-01-02,1,1,1,1,1\n2023-01-03,1,1,1,2,1\n"
        );
        let loaded = SeriesLoader::new().load(&text).unwrap();
        assert!(loaded.reordered);
        assert_eq!(loaded.series.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_body_is_empty_series() {
        let err = load_series(HEADER).unwrap_err();
        assert!(matches!(err, LoadError::EmptySeries));
    }

    #[test]
    fn empty_text_has_no_header() {
        let err = load_series("").unwrap_err();
        assert!(matches!(err, LoadError::Schema(SchemaError::NoHeader)));
    }

    #[test]
    fn missing_column_is_schema_error() {
        let err = load_series("date,open,high,low,close\n2023-01-02,1,1,1,1\n").unwrap_err();
        match err {
            LoadError::Schema(SchemaError::MissingColumns { missing, .. }) => {
                assert_eq!(missing, vec!["volume"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_price_names_row_and_column() {
        let text = format!("{HEADER}2023-01-02,1,1,1,1,1\n2023-01-03,1,abc,1,1,1\n");
        match load_series(&text).unwrap_err() {
            LoadError::Parse {
                row, column, value, ..
            } => {
                assert_eq!(row, 2);
                assert_eq!(column, "high");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_date_is_parse_error() {
        let text = format!("{HEADER}yesterday,1,1,1,1,1\n");
        match load_series(&text).unwrap_err() {
            LoadError::Parse { row, column, .. } => {
                assert_eq!(row, 1);
                assert_eq!(column, "date");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn negative_and_nan_prices_rejected() {
        let neg = format!("{HEADER}2023-01-02,1,1,1,-1,1\n");
        assert!(matches!(load_series(&neg), Err(LoadError::Parse { .. })));
        let nan = format!("{HEADER}2023-01-02,1,1,1,NaN,1\n");
        assert!(matches!(load_series(&nan), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn zero_price_is_accepted() {
        let text = format!("{HEADER}2023-01-02,1,1,0,0,1\n2023-01-03,0,2,0,2,1\n");
        let loaded = SeriesLoader::new().load(&text).unwrap();
        assert_eq!(loaded.series.closes(), vec![0.0, 2.0]);
        assert_eq!(parse_price("0"), Ok(0.0));
        assert_eq!(parse_price("-0.01"), Err("negative price"));
    }

    #[test]
    fn volume_accepts_integral_float() {
        assert_eq!(parse_volume("1200"), Ok(1200));
        assert_eq!(parse_volume("1200.0"), Ok(1200));
        assert!(parse_volume("12.5").is_err());
        assert!(parse_volume("-3").is_err());
        assert!(parse_volume("").is_err());
    }

    #[test]
    fn ragged_row_is_csv_error() {
        let text = format!("{HEADER}2023-01-02,1,1,1,1\n");
        assert!(matches!(load_series(&text), Err(LoadError::Csv(_))));
    }

    #[test]
    fn date_formats() {
        assert_eq!(parse_date("2023-01-05"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("2023/01/05"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("01/05/2023"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("2023-01-05 00:00:00"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("2023-01-05T09:30:00Z"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("2023-13-05"), None);
    }

    #[test]
    fn insane_rows_become_warnings() {
        let text = format!("{HEADER}2023-01-02,10,9,11,10,1\n");
        let loaded = SeriesLoader::new().load(&text).unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("high below low"));
    }

    #[test]
    fn header_columns_are_reported() {
        let text = "Date,Open,High,Low,Close,Volume,Ticker\n2023-01-02,1,1,1,1,1,SPY\n";
        let loaded = SeriesLoader::new().load(text).unwrap();
        assert_eq!(loaded.columns.len(), 7);
        assert_eq!(loaded.columns[6], "Ticker");
    }
}
