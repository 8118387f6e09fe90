use std::{collections::HashMap, path::Path};

use super::{fmt_opt, read_rows, write_rows, TableError};
use time::Date;

use crate::domain::{
    month::{format_date, month_start},
    MonthlyCostRecord,
};

pub const HEADER: [&str; 3] = ["date", "electricity_cost", "oil_cost"];

/// Read `utility_costs.csv`, sorted by month. Each month may appear once.
pub fn read(path: &Path) -> Result<Vec<MonthlyCostRecord>, TableError> {
    let mut first_seen: HashMap<Date, u64> = HashMap::new();
    let mut rows = read_rows(path, |row| {
        let date = month_start(row.date("date")?);
        if let Some(first) = first_seen.insert(date, row.line()) {
            return Err(format!("month {} already listed on line {first}", format_date(date)));
        }
        Ok(MonthlyCostRecord {
            date,
            electricity_cost: row.opt_f64("electricity_cost")?,
            oil_cost: row.opt_f64("oil_cost")?,
        })
    })?;
    rows.sort_by_key(|r| r.date);
    Ok(rows)
}

/// An absent cost is written as a blank cell.
pub fn write(path: &Path, rows: &[MonthlyCostRecord]) -> Result<(), TableError> {
    write_rows(
        path,
        &HEADER,
        rows.iter().map(|r| {
            vec![
                format_date(r.date),
                fmt_opt(r.electricity_cost, 2),
                fmt_opt(r.oil_cost, 2),
            ]
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use time::macros::date;

    #[test]
    fn blank_cells_are_absent_costs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("utility_costs.csv");
        fs::write(
            &path,
            "date,electricity_cost,oil_cost\n2022-02-01,,310.00\n2022-01-01,145.50,250.75\n",
        )
        .unwrap();

        let rows = read(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                MonthlyCostRecord {
                    date: date!(2022 - 01 - 01),
                    electricity_cost: Some(145.5),
                    oil_cost: Some(250.75),
                },
                MonthlyCostRecord {
                    date: date!(2022 - 02 - 01),
                    electricity_cost: None,
                    oil_cost: Some(310.0),
                },
            ]
        );
    }

    #[test]
    fn repeated_month_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("utility_costs.csv");
        fs::write(
            &path,
            "date,electricity_cost,oil_cost\n2022-01-01,145.50,\n2022-02-01,,310.00\n2022-01-01,99.00,\n",
        )
        .unwrap();

        match read(&path).unwrap_err() {
            TableError::Malformed { line, reason, .. } => {
                assert_eq!(line, 4);
                assert_eq!(reason, "month 2022-01-01 already listed on line 2");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn write_uses_two_decimals_and_blank_for_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("utility_costs.csv");
        write(
            &path,
            &[MonthlyCostRecord {
                date: date!(2023 - 01 - 01),
                electricity_cost: Some(160.0),
                oil_cost: None,
            }],
        )
        .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "date,electricity_cost,oil_cost\n2023-01-01,160.00,\n");
    }
}
