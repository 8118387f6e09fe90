use std::path::Path;

use super::{fmt_num, fmt_opt, read_rows, write_rows, TableError};
use crate::domain::{
    month::format_date, EfficiencyExclusion, EfficiencyRecord, EfficiencySummary,
};

pub const METRICS_HEADER: [&str; 6] = [
    "date",
    "fuel",
    "basis",
    "degree_days",
    "cost",
    "cost_per_degree_day",
];

pub const EXCLUSIONS_HEADER: [&str; 5] = ["date", "fuel", "basis", "degree_days", "reason"];

pub const SUMMARY_HEADER: [&str; 10] = [
    "year",
    "fuel",
    "months",
    "mean_cost_per_dd",
    "std_cost_per_dd",
    "min_cost_per_dd",
    "max_cost_per_dd",
    "total_cost",
    "total_degree_days",
    "annual_cost_per_dd",
];

/// Read `efficiency_metrics.csv`, sorted by month then series.
pub fn read_metrics(path: &Path) -> Result<Vec<EfficiencyRecord>, TableError> {
    let mut rows = read_rows(path, |row| {
        let cost_per_degree_day = row.f64("cost_per_degree_day")?;
        Ok(EfficiencyRecord {
            date: row.date("date")?,
            fuel: row.parse("fuel")?,
            basis: row.parse("basis")?,
            degree_days: row.f64("degree_days")?,
            cost: row.f64("cost")?,
            cost_per_degree_day,
        })
    })?;
    rows.sort_by_key(|r| (r.date, r.fuel));
    Ok(rows)
}

pub fn write_metrics(path: &Path, rows: &[EfficiencyRecord]) -> Result<(), TableError> {
    write_rows(
        path,
        &METRICS_HEADER,
        rows.iter().map(|r| {
            vec![
                format_date(r.date),
                r.fuel.to_string(),
                r.basis.to_string(),
                fmt_num(r.degree_days, 2),
                fmt_num(r.cost, 2),
                fmt_num(r.cost_per_degree_day, 4),
            ]
        }),
    )
}

pub fn write_exclusions(path: &Path, rows: &[EfficiencyExclusion]) -> Result<(), TableError> {
    write_rows(
        path,
        &EXCLUSIONS_HEADER,
        rows.iter().map(|r| {
            vec![
                format_date(r.date),
                r.fuel.to_string(),
                r.basis.to_string(),
                fmt_opt(r.degree_days, 2),
                r.reason.to_string(),
            ]
        }),
    )
}

pub fn write_summary(path: &Path, rows: &[EfficiencySummary]) -> Result<(), TableError> {
    write_rows(
        path,
        &SUMMARY_HEADER,
        rows.iter().map(|r| {
            vec![
                r.year.to_string(),
                r.fuel.to_string(),
                r.months.to_string(),
                fmt_num(r.mean_cost_per_dd, 2),
                fmt_opt(r.std_cost_per_dd, 2),
                fmt_num(r.min_cost_per_dd, 2),
                fmt_num(r.max_cost_per_dd, 2),
                fmt_num(r.total_cost, 2),
                fmt_num(r.total_degree_days, 2),
                fmt_opt(r.annual_cost_per_dd, 2),
            ]
        }),
    )
}
