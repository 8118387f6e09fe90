//! Readers and writers for the processed tables exchanged between stages.
//!
//! Every table is a flat CSV with a header row. Columns are looked up by
//! name, so extra columns are ignored on read. Writers always replace the
//! whole file.

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use csv::StringRecord;
use time::Date;

use crate::domain::month::parse_date;

pub mod costs;
pub mod efficiency;
pub mod rates;
pub mod savings;
pub mod weather;

pub const UTILITY_COSTS: &str = "utility_costs.csv";
pub const ELECTRIC_RATES: &str = "electric_rates.csv";
pub const OIL_RATES: &str = "oil_rates.csv";
pub const WEATHER_DATA: &str = "weather_data.csv";
pub const EFFICIENCY_METRICS: &str = "efficiency_metrics.csv";
pub const EFFICIENCY_EXCLUSIONS: &str = "efficiency_exclusions.csv";
pub const EFFICIENCY_SUMMARY: &str = "efficiency_summary.csv";
pub const MONTHLY_SAVINGS: &str = "monthly_savings.csv";

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("{} does not exist", .path.display())]
    NotFound { path: PathBuf },
    #[error("i/o error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("csv error in {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("{} line {line}: {reason}", .path.display())]
    Malformed { path: PathBuf, line: u64, reason: String },
}

impl TableError {
    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            TableError::NotFound { path: path.to_path_buf() }
        } else {
            TableError::Io { path: path.to_path_buf(), source }
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        TableError::Csv { path: path.to_path_buf(), source }
    }
}

/// One data row with by-name column access.
pub struct Row<'a> {
    record: &'a StringRecord,
    headers: &'a StringRecord,
}

impl<'a> Row<'a> {
    pub fn new(record: &'a StringRecord, headers: &'a StringRecord) -> Self {
        Self { record, headers }
    }

    /// 1-based line of this row in its file (the header is line 1).
    pub fn line(&self) -> u64 {
        self.record.position().map(|p| p.line()).unwrap_or(0)
    }

    fn column(&self, name: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| self.record.get(idx))
    }

    pub fn text(&self, name: &str) -> Result<&'a str, String> {
        self.column(name)
            .ok_or_else(|| format!("missing column '{name}'"))
    }

    /// `None` when the column is absent or the cell is blank.
    pub fn opt_str(&self, name: &str) -> Option<&'a str> {
        self.column(name).filter(|s| !s.is_empty())
    }

    pub fn f64(&self, name: &str) -> Result<f64, String> {
        let s = self.text(name)?;
        if s.is_empty() {
            return Err(format!("empty {name}"));
        }
        parse_finite(name, s)
    }

    pub fn opt_f64(&self, name: &str) -> Result<Option<f64>, String> {
        self.opt_str(name).map(|s| parse_finite(name, s)).transpose()
    }

    pub fn date(&self, name: &str) -> Result<Date, String> {
        parse_date(self.text(name)?)
    }

    pub fn parse<T>(&self, name: &str) -> Result<T, String>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let s = self.text(name)?;
        s.parse().map_err(|e| format!("invalid {name} '{s}': {e}"))
    }
}

fn parse_finite(name: &str, s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|e| format!("invalid {name} '{s}': {e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("invalid {name} '{s}': not a finite number"))
    }
}

/// Open a CSV for reading with trimmed fields.
pub fn open_reader(path: &Path) -> Result<csv::Reader<File>, TableError> {
    let file = File::open(path).map_err(|e| TableError::io(path, e))?;
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file))
}

/// Read every row of `path` through `parse`, stopping at the first row that
/// fails.
pub fn read_rows<T, F>(path: &Path, mut parse: F) -> Result<Vec<T>, TableError>
where
    F: FnMut(&Row<'_>) -> Result<T, String>,
{
    let mut rdr = open_reader(path)?;
    let headers = rdr.headers().map_err(|e| TableError::csv(path, e))?.clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| TableError::csv(path, e))?;
        let row = Row::new(&record, &headers);
        let parsed = parse(&row).map_err(|reason| TableError::Malformed {
            path: path.to_path_buf(),
            line: row.line(),
            reason,
        })?;
        rows.push(parsed);
    }
    Ok(rows)
}

/// Replace `path` with `header` followed by `rows`, creating parent
/// directories as needed.
pub fn write_rows<I>(path: &Path, header: &[&str], rows: I) -> Result<(), TableError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TableError::io(parent, e))?;
    }

    let mut wtr = csv::Writer::from_path(path).map_err(|e| TableError::csv(path, e))?;
    wtr.write_record(header).map_err(|e| TableError::csv(path, e))?;
    for row in rows {
        wtr.write_record(&row).map_err(|e| TableError::csv(path, e))?;
    }
    wtr.flush().map_err(|e| TableError::io(path, e))?;
    Ok(())
}

pub(crate) fn fmt_num(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

pub(crate) fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map(|v| fmt_num(v, decimals)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_rows_reports_line_of_malformed_row() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,value").unwrap();
        writeln!(file, "2023-01-01,1.5").unwrap();
        writeln!(file, "2023-02-01,abc").unwrap();

        let err = read_rows(file.path(), |row| row.f64("value")).unwrap_err();
        match err {
            TableError::Malformed { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("invalid value 'abc'"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_rows(&dir.path().join("nope.csv"), |row| row.f64("x")).unwrap_err();
        assert!(matches!(err, TableError::NotFound { .. }));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "value,other").unwrap();
        writeln!(file, "NaN,").unwrap();

        assert!(read_rows(file.path(), |row| row.f64("value")).is_err());
        let blanks = read_rows(file.path(), |row| row.opt_f64("other")).unwrap();
        assert_eq!(blanks, vec![None]);
    }
}
