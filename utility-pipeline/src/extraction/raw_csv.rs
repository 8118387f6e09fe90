use std::{
    collections::HashMap,
    fs::{self, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::Path,
};

use time::Date;
use utility_model::{
    domain::{month::format_date, BillingRecord},
    tables::{self, Row},
    TableError,
};

const DEFAULT_HEADER: [&str; 3] = ["date", "amount", "kwh_used"];

/// Raw rows carry one bill per date; the amount is kept in cents to tell a
/// repeat from a conflicting bill.
type Billed = HashMap<Date, i64>;

fn cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

fn io_err(path: &Path, source: std::io::Error) -> TableError {
    TableError::Io { path: path.to_path_buf(), source }
}

fn csv_err(path: &Path, source: csv::Error) -> TableError {
    TableError::Csv { path: path.to_path_buf(), source }
}

/// Header and already billed dates of `path`, or `None` when it does not
/// exist.
fn existing(path: &Path) -> Result<Option<(Vec<String>, Billed)>, TableError> {
    let mut rdr = match tables::open_reader(path) {
        Ok(rdr) => rdr,
        Err(TableError::NotFound { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };
    let headers = rdr.headers().map_err(|e| csv_err(path, e))?.clone();

    let mut billed = HashMap::new();
    for result in rdr.records() {
        let record = result.map_err(|e| csv_err(path, e))?;
        let row = Row::new(&record, &headers);
        let parsed = row.date("date").and_then(|d| Ok((d, cents(row.f64("amount")?))));
        match parsed {
            Ok((date, amount)) => {
                billed.entry(date).or_insert(amount);
            }
            Err(reason) => {
                return Err(TableError::Malformed {
                    path: path.to_path_buf(),
                    line: row.line(),
                    reason,
                })
            }
        }
    }
    Ok(Some((headers.iter().map(str::to_string).collect(), billed)))
}

fn cell(column: &str, record: &BillingRecord) -> String {
    match column {
        "date" => format_date(record.date),
        "amount" => format!("{:.2}", record.amount),
        "kwh_used" => record.quantity.map(|q| format!("{q}")).unwrap_or_default(),
        "rate" => match record.quantity {
            Some(q) if q > 0.0 => format!("{:.6}", record.amount / q),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Whether the file's last byte is a newline (an empty file counts as one).
fn ends_with_newline(path: &Path) -> std::io::Result<bool> {
    let mut file = fs::File::open(path)?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Append `records` to the raw electric table, writing a header when the
/// file is new. A bill whose date is already present is skipped, with a
/// warning when its amount differs. Returns how many rows were appended.
pub fn append_electric(path: &Path, records: &[BillingRecord]) -> Result<usize, TableError> {
    let (header, mut seen, is_new) = match existing(path)? {
        Some((header, seen)) => (header, seen, false),
        None => (
            DEFAULT_HEADER.iter().map(|s| s.to_string()).collect(),
            HashMap::new(),
            true,
        ),
    };

    let fresh: Vec<&BillingRecord> = records
        .iter()
        .filter(|r| match seen.get(&r.date) {
            None => {
                seen.insert(r.date, cents(r.amount));
                true
            }
            Some(&recorded) if recorded == cents(r.amount) => {
                tracing::info!(date = %r.date, amount = r.amount, "bill already recorded, skipping");
                false
            }
            Some(&recorded) => {
                tracing::warn!(
                    date = %r.date,
                    amount = r.amount,
                    recorded = recorded as f64 / 100.0,
                    "another bill is already recorded for this date, skipping"
                );
                false
            }
        })
        .collect();

    if fresh.is_empty() && !is_new {
        return Ok(0);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let needs_newline = !is_new && !ends_with_newline(path).map_err(|e| io_err(path, e))?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err(path, e))?;
    if needs_newline {
        file.write_all(b"\n").map_err(|e| io_err(path, e))?;
    }

    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    if is_new {
        wtr.write_record(&header).map_err(|e| csv_err(path, e))?;
    }
    for record in &fresh {
        let row: Vec<String> = header.iter().map(|col| cell(col, record)).collect();
        wtr.write_record(&row).map_err(|e| csv_err(path, e))?;
    }
    wtr.flush().map_err(|e| io_err(path, e))?;

    Ok(fresh.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use time::macros::date;
    use utility_model::domain::Fuel;

    fn bill(date: Date, amount: f64, kwh: Option<f64>) -> BillingRecord {
        BillingRecord { fuel: Fuel::Electricity, date, amount, quantity: kwh }
    }

    #[test]
    fn new_file_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("electric_raw.csv");

        let n = append_electric(&path, &[bill(date!(2023 - 01 - 12), 145.5, Some(250.75))]).unwrap();
        assert_eq!(n, 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "date,amount,kwh_used\n2023-01-12,145.50,250.75\n"
        );
    }

    #[test]
    fn rerun_does_not_duplicate_and_keeps_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("electric_raw.csv");
        fs::write(&path, "date,amount,kwh_used,rate\n2023-01,145.50,250.75,0.58").unwrap();

        let records = [
            bill(date!(2023 - 01 - 01), 145.5, Some(250.75)),
            bill(date!(2023 - 02 - 01), 100.0, Some(400.0)),
            bill(date!(2023 - 02 - 01), 100.0, Some(400.0)),
        ];
        assert_eq!(append_electric(&path, &records).unwrap(), 1);
        assert_eq!(append_electric(&path, &records).unwrap(), 0);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "date,amount,kwh_used,rate\n2023-01,145.50,250.75,0.58\n2023-02-01,100.00,400,0.250000\n"
        );
    }

    #[test]
    fn second_bill_on_a_recorded_date_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("electric_raw.csv");
        fs::write(&path, "date,amount,kwh_used
2023-01-12,145.50,250
").unwrap();

        let records = [
            bill(date!(2023 - 01 - 12), 99.0, Some(100.0)),
            bill(date!(2023 - 02 - 12), 80.0, None),
            bill(date!(2023 - 02 - 12), 81.0, None),
        ];
        assert_eq!(append_electric(&path, &records).unwrap(), 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "date,amount,kwh_used
2023-01-12,145.50,250
2023-02-12,80.00,
"
        );
    }

    #[test]
    fn malformed_existing_row_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("electric_raw.csv");
        fs::write(&path, "date,amount,kwh_used\nsoon,1.0,2\n").unwrap();

        let err = append_electric(&path, &[bill(date!(2023 - 01 - 01), 1.0, None)]).unwrap_err();
        assert!(matches!(err, TableError::Malformed { line: 2, .. }), "{err}");
    }
}
