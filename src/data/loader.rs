use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use std::path::Path;

/// Date layouts tried in order when parsing the date column.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// The file as read, before any typing. Empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Cells of one column; short rows yield `None`.
    pub fn column(&self, index: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|c| c.as_deref()))
    }
}

/// Result of [`DataLoader::load`].
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub table: RawTable,
    pub series: TimeSeries,
}

/// Reads a two-column (date, reach) CSV file.
#[derive(Debug, Clone)]
pub struct DataLoader {
    date_column: String,
    value_column: String,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new("Date", "Instagram reach")
    }
}

impl DataLoader {
    pub fn new(date_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
            value_column: value_column.into(),
        }
    }

    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    fn verify_required_columns(&self, table: &RawTable) -> Result<(usize, usize)> {
        let date = table
            .column_index(&self.date_column)
            .ok_or_else(|| ForecastError::MissingColumn(self.date_column.clone()))?;
        let value = table
            .column_index(&self.value_column)
            .ok_or_else(|| ForecastError::MissingColumn(self.value_column.clone()))?;
        Ok((date, value))
    }

    /// Read the file into a raw table without interpreting any cell.
    pub fn read_table<P: AsRef<Path>>(path: P) -> Result<RawTable> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&path)?;

        let headers: Vec<String> = rdr.headers()?.iter().map(|s| s.to_string()).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                    .collect(),
            );
        }
        Ok(RawTable { headers, rows })
    }

    /// Load the file and build the date-ordered series.
    ///
    /// Empty reach cells load as `NaN`. A null or unparseable date, a
    /// non-numeric reach value, or a repeated date fails the load.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<LoadedData> {
        let table = Self::read_table(&path)?;
        let (date_idx, value_idx) = self.verify_required_columns(&table)?;

        let mut observations = Vec::with_capacity(table.num_rows());
        for (row, (date_cell, value_cell)) in table
            .column(date_idx)
            .zip(table.column(value_idx))
            .enumerate()
        {
            let date = match date_cell {
                Some(text) => parse_date(text)?,
                None => {
                    return Err(ForecastError::TimestampError(format!(
                        "null date at row {}",
                        row
                    )))
                }
            };
            let value = match value_cell {
                Some(text) => text.parse::<f64>().map_err(|_| ForecastError::InvalidValue {
                    column: self.value_column.clone(),
                    row,
                    value: text.to_string(),
                })?,
                None => f64::NAN,
            };
            observations.push((date, value));
        }

        observations.sort_by_key(|(date, _)| *date);
        let (dates, values) = observations.into_iter().unzip();
        let series = TimeSeries::new(dates, values)?.with_label(self.value_column.clone());

        log::info!(
            "loaded {} rows from {}",
            series.len(),
            path.as_ref().display()
        );
        Ok(LoadedData { table, series })
    }
}

/// Parse a date in any of the accepted layouts. Time-of-day is dropped.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| ForecastError::TimestampError(format!("unparseable date '{}'", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_every_supported_layout() {
        let expected = NaiveDate::from_ymd_opt(2022, 4, 3).unwrap();
        for text in [
            "2022-04-03",
            "2022-04-03T10:15:00",
            "2022-04-03 23:59:59",
            "04/03/2022",
            "2022/04/03",
            "03-04-2022",
        ] {
            assert_eq!(parse_date(text).unwrap(), expected, "layout {}", text);
        }
        assert!(matches!(
            parse_date("yesterday"),
            Err(ForecastError::TimestampError(_))
        ));
    }

    #[test]
    fn loads_and_sorts_rows() {
        let file = csv_file(
            "Date,Instagram reach\n2022-04-03,300\n2022-04-01,100\n2022-04-02,200\n",
        );
        let data = DataLoader::default().load(file.path()).unwrap();
        assert_eq!(data.series.values(), &[100.0, 200.0, 300.0]);
        assert_eq!(
            data.series.first_date(),
            NaiveDate::from_ymd_opt(2022, 4, 1)
        );
        assert_eq!(data.series.label(), Some("Instagram reach"));
        assert_eq!(data.table.num_rows(), 3);
    }

    #[test]
    fn empty_reach_loads_as_nan() {
        let file = csv_file("Date,Instagram reach\n2022-04-01,100\n2022-04-02,\n");
        let data = DataLoader::default().load(file.path()).unwrap();
        assert!(data.series.values()[1].is_nan());
        assert!(data.series.has_missing_values());
    }

    #[test]
    fn header_only_file_loads_empty_series() {
        let file = csv_file("Date,Instagram reach\n");
        let data = DataLoader::default().load(file.path()).unwrap();
        assert!(data.series.is_empty());
    }

    #[test]
    fn column_names_are_configurable() {
        let file = csv_file("day,views\n2022-04-01,7\n");
        let data = DataLoader::new("day", "views").load(file.path()).unwrap();
        assert_eq!(data.series.values(), &[7.0]);
    }

    #[test]
    fn missing_column_is_reported() {
        let file = csv_file("Date,reach\n2022-04-01,7\n");
        assert!(matches!(
            DataLoader::default().load(file.path()),
            Err(ForecastError::MissingColumn(c)) if c == "Instagram reach"
        ));
    }

    #[test]
    fn malformed_rows_fail() {
        let bad_date = csv_file("Date,Instagram reach\nnot-a-date,7\n");
        assert!(matches!(
            DataLoader::default().load(bad_date.path()),
            Err(ForecastError::TimestampError(_))
        ));

        let null_date = csv_file("Date,Instagram reach\n,7\n");
        assert!(matches!(
            DataLoader::default().load(null_date.path()),
            Err(ForecastError::TimestampError(_))
        ));

        let bad_value = csv_file("Date,Instagram reach\n2022-04-01,lots\n");
        assert!(matches!(
            DataLoader::default().load(bad_value.path()),
            Err(ForecastError::InvalidValue { row: 0, .. })
        ));

        let duplicate = csv_file("Date,Instagram reach\n2022-04-01,1\n2022-04-01,2\n");
        assert!(matches!(
            DataLoader::default().load(duplicate.path()),
            Err(ForecastError::TimestampError(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = DataLoader::default().load("/definitely/not/here.csv");
        assert!(matches!(result, Err(ForecastError::Csv(_))));
    }
}
