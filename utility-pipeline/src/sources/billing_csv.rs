use std::{collections::HashMap, path::PathBuf};

use utility_model::{
    domain::{BillingRecord, Fuel},
    tables::{open_reader, Row},
};

use crate::pipeline::{Envelope, Origin, PipelineError, RecordStream, Source};

/// Raw billing CSV for one fuel.
///
/// Expected header columns (by name):
/// - date (`YYYY-MM-DD` or `YYYY-MM`)
/// - amount
/// - kwh_used (electricity) / gallons (oil); cells may be blank
///
/// Provider-computed `rate` / `price_per_gallon` columns are ignored; rates
/// are recomputed from the monthly sums.
///
/// A date may appear only once per file; a repeat is an error naming both
/// lines.
pub struct BillingCsvSource {
    path: PathBuf,
    fuel: Fuel,
}

impl BillingCsvSource {
    pub fn new<P: Into<PathBuf>>(path: P, fuel: Fuel) -> Self {
        Self { path: path.into(), fuel }
    }
}

fn row_to_billing_record(row: &Row<'_>, fuel: Fuel) -> Result<BillingRecord, String> {
    let date = row.date("date")?;
    let amount = row.f64("amount")?;

    let quantity_column = fuel.quantity_column();
    row.text(quantity_column)?;
    let quantity = row.opt_f64(quantity_column)?;

    Ok(BillingRecord { fuel, date, amount, quantity })
}

#[async_trait::async_trait]
impl Source<BillingRecord> for BillingCsvSource {
    async fn stream(&self) -> RecordStream<BillingRecord> {
        let path = self.path.clone();
        let fuel = self.fuel;
        let s = async_stream::try_stream! {
            let mut rdr = open_reader(&path)
                .map_err(|e| PipelineError::Source(e.to_string()))?;
            let headers = rdr
                .headers()
                .map_err(|e| PipelineError::Source(format!(
                    "failed to read CSV headers of {}: {e}", path.display()
                )))?
                .clone();

            let mut first_seen: HashMap<time::Date, u64> = HashMap::new();
            for result in rdr.records() {
                let record = result.map_err(|e| PipelineError::Source(format!(
                    "failed to read CSV record in {}: {e}", path.display()
                )))?;
                let row = Row::new(&record, &headers);
                let origin = Origin { path: path.clone(), line: row.line() };

                let billing = match row_to_billing_record(&row, fuel) {
                    Ok(b) => b,
                    Err(reason) => {
                        metrics::counter!("billing_csv_parse_errors_total").increment(1);
                        Err(PipelineError::Source(format!("{origin}: {reason}")))?
                    }
                };

                if let Some(first) = first_seen.insert(billing.date, origin.line) {
                    metrics::counter!("billing_csv_parse_errors_total").increment(1);
                    Err::<(), _>(PipelineError::Source(format!(
                        "{origin}: date {} already billed on line {first}",
                        billing.date
                    )))?;
                }

                yield Envelope { payload: billing, origin };
            }
        };

        Box::pin(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::fs;
    use time::macros::date;

    async fn collect(path: &std::path::Path, fuel: Fuel) -> Vec<Result<Envelope<BillingRecord>, PipelineError>> {
        BillingCsvSource::new(path, fuel).stream().await.collect().await
    }

    #[tokio::test]
    async fn reads_month_level_electric_bills_with_blank_usage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("electric_raw.csv");
        fs::write(&path, "date,amount,kwh_used,rate\n2023-01,145.50,820,0.177\n2023-02,130.00,,\n").unwrap();

        let items = collect(&path, Fuel::Electricity).await;
        let records: Vec<_> = items.into_iter().map(|r| r.unwrap().payload).collect();
        assert_eq!(
            records,
            vec![
                BillingRecord {
                    fuel: Fuel::Electricity,
                    date: date!(2023 - 01 - 01),
                    amount: 145.5,
                    quantity: Some(820.0),
                },
                BillingRecord {
                    fuel: Fuel::Electricity,
                    date: date!(2023 - 02 - 01),
                    amount: 130.0,
                    quantity: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn unparseable_date_names_file_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oil_raw.csv");
        fs::write(&path, "date,amount,gallons\n2023-01-14,399.0,120.5\nJan 30,410.0,118\n").unwrap();

        let items = collect(&path, Fuel::Oil).await;
        assert!(items[0].is_ok());
        let err = items[1].as_ref().unwrap_err().to_string();
        assert!(err.contains("oil_raw.csv line 3"), "{err}");
        assert!(err.contains("invalid date 'Jan 30'"), "{err}");
    }

    #[tokio::test]
    async fn repeated_date_names_both_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("electric_raw.csv");
        fs::write(&path, "date,amount,kwh_used
2023-01-05,50.00,500
2023-01-05,50.00,500
").unwrap();

        let items = collect(&path, Fuel::Electricity).await;
        assert!(items[0].is_ok());
        let err = items[1].as_ref().unwrap_err().to_string();
        assert!(err.contains("electric_raw.csv line 3"), "{err}");
        assert!(err.contains("already billed on line 2"), "{err}");
    }

    #[tokio::test]
    async fn missing_quantity_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oil_raw.csv");
        fs::write(&path, "date,amount\n2023-01-14,399.0\n").unwrap();

        let items = collect(&path, Fuel::Oil).await;
        let err = items[0].as_ref().unwrap_err().to_string();
        assert!(err.contains("missing column 'gallons'"), "{err}");
    }
}
