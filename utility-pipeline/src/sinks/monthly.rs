use std::collections::BTreeMap;

use futures::StreamExt;
use time::Date;
use utility_model::domain::{month::month_start, BillingRecord, Fuel, MonthlyUsage};

use crate::pipeline::{Envelope, PipelineError, Sink};

/// Sum raw entries into one `MonthlyUsage` per (fuel, calendar month),
/// ordered by fuel then month.
pub fn aggregate_monthly<I>(records: I) -> Vec<MonthlyUsage>
where
    I: IntoIterator<Item = BillingRecord>,
{
    let mut buckets: BTreeMap<(Fuel, Date), MonthlyUsage> = BTreeMap::new();

    for r in records {
        let month = month_start(r.date);
        let bucket = buckets.entry((r.fuel, month)).or_insert_with(|| MonthlyUsage {
            fuel: r.fuel,
            month,
            amount: 0.0,
            metered_amount: 0.0,
            quantity: None,
            entries: 0,
        });
        bucket.amount += r.amount;
        if let Some(q) = r.quantity {
            bucket.quantity = Some(bucket.quantity.unwrap_or(0.0) + q);
            bucket.metered_amount += r.amount;
        }
        bucket.entries += 1;
    }

    buckets.into_values().collect()
}

/// Collects validated billing records and aggregates them by month. Any
/// upstream error aborts the run: dropping a bill would corrupt the totals.
#[derive(Clone, Default)]
pub struct MonthlyAggregateSink;

#[async_trait::async_trait]
impl Sink<BillingRecord> for MonthlyAggregateSink {
    type Output = Vec<MonthlyUsage>;

    async fn run<S>(&self, mut input: S) -> Result<Self::Output, PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<BillingRecord>, PipelineError>>
            + Send
            + Unpin
            + 'static,
    {
        let mut records = Vec::new();

        while let Some(item) = input.next().await {
            match item {
                Ok(env) => records.push(env.payload),
                Err(e) => {
                    tracing::error!(error = %e, "aborting monthly aggregation");
                    return Err(e);
                }
            }
        }

        let monthly = aggregate_monthly(records);
        metrics::counter!("billing_months_aggregated_total").increment(monthly.len() as u64);
        Ok(monthly)
    }
}
