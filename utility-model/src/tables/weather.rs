use std::path::Path;

use super::{fmt_num, fmt_opt, read_rows, write_rows, TableError};
use crate::domain::{month::format_date, WeatherRecord};

pub const HEADER: [&str; 8] = [
    "date",
    "avg_temp",
    "min_temp",
    "max_temp",
    "precipitation",
    "snow",
    "hdd",
    "cdd",
];

/// Read `weather_data.csv`, sorted by month.
pub fn read(path: &Path) -> Result<Vec<WeatherRecord>, TableError> {
    let mut rows = read_rows(path, |row| {
        Ok(WeatherRecord {
            date: row.date("date")?,
            avg_temp: row.f64("avg_temp")?,
            min_temp: row.opt_f64("min_temp")?,
            max_temp: row.opt_f64("max_temp")?,
            precipitation: row.opt_f64("precipitation")?.unwrap_or(0.0),
            snow: row.opt_f64("snow")?.unwrap_or(0.0),
            hdd: row.f64("hdd")?,
            cdd: row.f64("cdd")?,
        })
    })?;
    rows.sort_by_key(|r| r.date);
    Ok(rows)
}

pub fn write(path: &Path, rows: &[WeatherRecord]) -> Result<(), TableError> {
    write_rows(
        path,
        &HEADER,
        rows.iter().map(|r| {
            vec![
                format_date(r.date),
                fmt_num(r.avg_temp, 2),
                fmt_opt(r.min_temp, 1),
                fmt_opt(r.max_temp, 1),
                fmt_num(r.precipitation, 1),
                fmt_num(r.snow, 1),
                fmt_num(r.hdd, 2),
                fmt_num(r.cdd, 2),
            ]
        }),
    )
}
