use std::path::Path;

use super::{fmt_num, write_rows, TableError};
use crate::domain::{month::format_date, Fuel, RateRecord};

/// Columns: `date,unit_rate,<kwh_used|gallons>`.
pub fn write(path: &Path, fuel: Fuel, rows: &[RateRecord]) -> Result<(), TableError> {
    write_rows(
        path,
        &["date", "unit_rate", fuel.quantity_column()],
        rows.iter().map(|r| {
            vec![
                format_date(r.date),
                fmt_num(r.unit_rate, 6),
                fmt_num(r.quantity, 3),
            ]
        }),
    )
}
