use std::path::Path;

use super::{fmt_num, fmt_opt, write_rows, TableError};
use crate::domain::SavingsRecord;

pub const HEADER: [&str; 12] = [
    "month",
    "current_year",
    "prior_year",
    "fuel",
    "current_year_cost",
    "prior_year_cost",
    "absolute_savings",
    "percent_savings",
    "running_total",
    "normalized_savings",
    "current_degree_days",
    "prior_degree_days",
];

/// Write `monthly_savings.csv`; undefined percentages, normalized savings
/// and unknown degree-days are blank.
pub fn write(path: &Path, rows: &[SavingsRecord]) -> Result<(), TableError> {
    write_rows(
        path,
        &HEADER,
        rows.iter().map(|r| {
            vec![
                u8::from(r.month).to_string(),
                r.current_year.to_string(),
                r.prior_year.to_string(),
                r.fuel.to_string(),
                fmt_num(r.current_year_cost, 2),
                fmt_num(r.prior_year_cost, 2),
                fmt_num(r.absolute_savings, 2),
                fmt_opt(r.percent_savings, 2),
                fmt_num(r.running_total, 2),
                fmt_opt(r.normalized_savings, 2),
                fmt_opt(r.current_degree_days, 2),
                fmt_opt(r.prior_degree_days, 2),
            ]
        }),
    )
}
