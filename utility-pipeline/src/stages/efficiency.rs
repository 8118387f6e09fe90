use utility_model::{
    domain::DegreeDayBasis,
    tables::{self, costs, efficiency, weather},
};

use super::require_input;
use crate::{analysis::compute_efficiency, config::AppConfig, error::StageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSummary {
    pub metrics: usize,
    pub exclusions: usize,
    pub high_cost_months: usize,
}

/// Join the cost and weather tables into `efficiency_metrics.csv` and
/// `efficiency_exclusions.csv`.
pub fn run(cfg: &AppConfig) -> Result<MetricsSummary, StageError> {
    let costs_path = cfg.paths.utility_costs();
    let weather_path = cfg.paths.weather_data();
    require_input(&costs_path, "normalize")?;
    require_input(&weather_path, "fetch-weather")?;

    let cost_rows = costs::read(&costs_path)?;
    let weather_rows = weather::read(&weather_path)?;
    let outcome = compute_efficiency(&cost_rows, &weather_rows, cfg.efficiency.min_degree_days);

    for e in &outcome.exclusions {
        tracing::warn!(
            month = %e.date,
            fuel = %e.fuel,
            basis = %e.basis,
            degree_days = ?e.degree_days,
            reason = %e.reason,
            "month excluded from efficiency"
        );
    }

    let threshold = cfg.efficiency.high_cost_warning;
    let mut high_cost_months = 0;
    for r in outcome
        .records
        .iter()
        .filter(|r| r.basis == DegreeDayBasis::Heating && r.cost_per_degree_day > threshold)
    {
        high_cost_months += 1;
        tracing::warn!(
            month = %r.date,
            fuel = %r.fuel,
            cost_per_hdd = r.cost_per_degree_day,
            threshold,
            "unusually high cost per heating degree-day"
        );
    }

    let metrics_path = cfg.paths.efficiency_metrics();
    efficiency::write_metrics(&metrics_path, &outcome.records)?;
    let exclusions_path = cfg.paths.processed(tables::EFFICIENCY_EXCLUSIONS);
    efficiency::write_exclusions(&exclusions_path, &outcome.exclusions)?;

    tracing::info!(
        path = %metrics_path.display(),
        metrics = outcome.records.len(),
        exclusions = outcome.exclusions.len(),
        "wrote efficiency metrics"
    );
    Ok(MetricsSummary {
        metrics: outcome.records.len(),
        exclusions: outcome.exclusions.len(),
        high_cost_months,
    })
}
