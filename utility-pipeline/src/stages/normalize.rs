use std::{collections::HashMap, path::Path, sync::Arc};

use time::Date;
use utility_model::{
    domain::{month::months_between, Fuel, MonthlyCostRecord, MonthlyUsage, RateRecord},
    tables::{self, costs, rates},
};

use super::require_input;
use crate::{
    config::AppConfig,
    error::StageError,
    pipeline::Pipeline,
    sinks::MonthlyAggregateSink,
    sources::BillingCsvSource,
    transform::BillingRecordValidation,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub months: usize,
    pub electric_rates: usize,
    pub oil_rates: usize,
}

fn raw_producer(fuel: Fuel) -> &'static str {
    match fuel {
        Fuel::Electricity => "extract (or manual entry)",
        Fuel::Oil => "manual entry of oil deliveries",
    }
}

async fn monthly_usage(path: &Path, fuel: Fuel) -> Result<Vec<MonthlyUsage>, StageError> {
    let pipeline = Pipeline {
        source: BillingCsvSource::new(path, fuel),
        transforms: vec![Arc::new(BillingRecordValidation)],
        sink: MonthlyAggregateSink,
    };
    let monthly = pipeline.run().await?;
    tracing::info!(
        fuel = %fuel,
        path = %path.display(),
        months = monthly.len(),
        "aggregated raw billing"
    );
    Ok(monthly)
}

/// One row per calendar month from the earliest to the latest billed month
/// of either fuel. A fuel with no bill in a month is left absent.
pub fn combine_monthly_costs(
    electric: &[MonthlyUsage],
    oil: &[MonthlyUsage],
) -> Vec<MonthlyCostRecord> {
    let lookup = |usage: &[MonthlyUsage]| -> HashMap<Date, f64> {
        usage.iter().map(|u| (u.month, u.amount)).collect()
    };
    let electric_by_month = lookup(electric);
    let oil_by_month = lookup(oil);

    let months = electric.iter().chain(oil).map(|u| u.month);
    let (Some(first), Some(last)) = (months.clone().min(), months.max()) else {
        return Vec::new();
    };

    months_between(first, last)
        .into_iter()
        .map(|date| MonthlyCostRecord {
            date,
            electricity_cost: electric_by_month.get(&date).copied(),
            oil_cost: oil_by_month.get(&date).copied(),
        })
        .collect()
}

/// Months with a defined unit rate, in month order.
pub fn rate_table(usage: &[MonthlyUsage]) -> Vec<RateRecord> {
    let mut rows: Vec<RateRecord> = usage.iter().filter_map(RateRecord::from_usage).collect();
    rows.sort_by_key(|r| r.date);
    rows
}

/// Raw electric and oil CSVs to `utility_costs.csv` and the two rate tables.
/// Nothing is written unless both raw files parse cleanly.
pub async fn run(cfg: &AppConfig) -> Result<NormalizeSummary, StageError> {
    let electric_raw = cfg.paths.electric_raw();
    let oil_raw = cfg.paths.oil_raw();
    require_input(&electric_raw, raw_producer(Fuel::Electricity))?;
    require_input(&oil_raw, raw_producer(Fuel::Oil))?;

    let electric = monthly_usage(&electric_raw, Fuel::Electricity).await?;
    let oil = monthly_usage(&oil_raw, Fuel::Oil).await?;

    let costs_table = combine_monthly_costs(&electric, &oil);
    if costs_table.is_empty() {
        return Err(StageError::Empty(format!(
            "no billing rows in {} or {}",
            electric_raw.display(),
            oil_raw.display()
        )));
    }

    let electric_rates = rate_table(&electric);
    let oil_rates = rate_table(&oil);
    for (fuel, usage, rated) in [
        (Fuel::Electricity, &electric, electric_rates.len()),
        (Fuel::Oil, &oil, oil_rates.len()),
    ] {
        if rated < usage.len() {
            tracing::warn!(
                fuel = %fuel,
                months = usage.len() - rated,
                "months without {} have no unit rate",
                fuel.quantity_column()
            );
        }
    }

    let costs_path = cfg.paths.utility_costs();
    costs::write(&costs_path, &costs_table)?;
    rates::write(&cfg.paths.processed(tables::ELECTRIC_RATES), Fuel::Electricity, &electric_rates)?;
    rates::write(&cfg.paths.processed(tables::OIL_RATES), Fuel::Oil, &oil_rates)?;

    let summary = NormalizeSummary {
        months: costs_table.len(),
        electric_rates: electric_rates.len(),
        oil_rates: oil_rates.len(),
    };
    tracing::info!(
        path = %costs_path.display(),
        months = summary.months,
        electric_rates = summary.electric_rates,
        oil_rates = summary.oil_rates,
        "wrote monthly cost table"
    );
    Ok(summary)
}
