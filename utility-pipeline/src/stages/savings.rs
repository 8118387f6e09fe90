use std::path::PathBuf;

use utility_model::{
    domain::{CostComponent, SavingsRecord},
    tables::{self, costs, savings, weather},
};

use super::require_input;
use crate::{
    analysis::monthly_savings,
    charts::{render_savings, SAVINGS_ANALYSIS},
    config::AppConfig,
    error::StageError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SavingsSummary {
    pub rows: usize,
    pub current_year: i32,
    pub prior_year: i32,
    /// Sum of absolute savings of the total series for the latest year pair.
    pub total_savings: f64,
    /// Sum of normalized savings over the months where it is defined.
    pub normalized_savings: Option<f64>,
    pub report: PathBuf,
    pub chart: PathBuf,
}

/// Rows of the most recent year pair for one series.
fn latest_pair(rows: &[SavingsRecord], fuel: CostComponent) -> Vec<SavingsRecord> {
    let Some(year) = rows.iter().map(|r| r.current_year).max() else {
        return Vec::new();
    };
    rows.iter()
        .filter(|r| r.current_year == year && r.fuel == fuel)
        .cloned()
        .collect()
}

/// Year-over-year savings: `monthly_savings.csv` and `savings_analysis.png`
/// in the output directory. Weather is optional; without it normalized
/// savings are left blank.
pub fn run(cfg: &AppConfig) -> Result<SavingsSummary, StageError> {
    let costs_path = cfg.paths.utility_costs();
    require_input(&costs_path, "normalize")?;
    let cost_rows = costs::read(&costs_path)?;

    let weather_path = cfg.paths.weather_data();
    let weather_rows = if weather_path.is_file() {
        Some(weather::read(&weather_path)?)
    } else {
        tracing::info!(
            path = %weather_path.display(),
            "no weather table, normalized savings left blank"
        );
        None
    };

    let rows = monthly_savings(&cost_rows, weather_rows.as_deref());
    if rows.is_empty() {
        return Err(StageError::Empty(
            "savings need the same month billed in two consecutive years".to_string(),
        ));
    }

    let report = cfg.paths.output(tables::MONTHLY_SAVINGS);
    savings::write(&report, &rows)?;

    let mut latest = latest_pair(&rows, CostComponent::Total);
    if latest.is_empty() {
        latest = latest_pair(&rows, CostComponent::Electricity);
    }
    if latest.is_empty() {
        latest = latest_pair(&rows, CostComponent::Oil);
    }
    let Some(first) = latest.first() else {
        return Err(StageError::Empty("no savings rows for the latest year".to_string()));
    };
    let (current_year, prior_year) = (first.current_year, first.prior_year);

    let chart = cfg.paths.output(SAVINGS_ANALYSIS);
    render_savings(&chart, &latest)?;

    let total_savings: f64 = latest.iter().map(|r| r.absolute_savings).sum();
    let normalized: Vec<f64> = latest.iter().filter_map(|r| r.normalized_savings).collect();
    let normalized_savings = (!normalized.is_empty()).then(|| normalized.iter().sum());

    for fuel in CostComponent::ALL {
        let pair = latest_pair(&rows, fuel);
        if pair.is_empty() {
            continue;
        }
        tracing::info!(
            fuel = %fuel,
            current_year,
            prior_year,
            months = pair.len(),
            savings = format!("{:.2}", pair.iter().map(|r| r.absolute_savings).sum::<f64>()),
            "savings summary"
        );
    }
    tracing::info!(
        report = %report.display(),
        chart = %chart.display(),
        total_savings = format!("{total_savings:.2}"),
        normalized_savings = ?normalized_savings,
        "wrote savings analysis"
    );

    Ok(SavingsSummary {
        rows: rows.len(),
        current_year,
        prior_year,
        total_savings,
        normalized_savings,
        report,
        chart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testutil::{config_in, write};
    use std::fs;

    #[test]
    fn january_scenario_report() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        write(
            &cfg.paths.utility_costs(),
            "date,electricity_cost,oil_cost\n2022-01-01,145.50,\n2023-01-01,160.00,\n",
        );

        let summary = run(&cfg).unwrap();
        assert_eq!((summary.current_year, summary.prior_year), (2023, 2022));
        assert!((summary.total_savings + 14.50).abs() < 1e-9);
        assert_eq!(summary.normalized_savings, None);
        assert!(summary.chart.exists());

        let report = fs::read_to_string(&summary.report).unwrap();
        assert!(
            report.contains("1,2023,2022,electricity,160.00,145.50,-14.50,-9.97,-14.50,,,\n"),
            "{report}"
        );
    }

    #[test]
    fn weather_enables_normalized_savings() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        write(
            &cfg.paths.utility_costs(),
            "date,electricity_cost,oil_cost\n2022-01-01,,400.00\n2023-01-01,,300.00\n",
        );
        write(
            &cfg.paths.weather_data(),
            "date,avg_temp,min_temp,max_temp,precipitation,snow,hdd,cdd\n\
             2022-01-01,-8.00,,,0.0,0.0,800.00,0.00\n\
             2023-01-01,2.00,,,0.0,0.0,500.00,0.00\n",
        );

        let summary = run(&cfg).unwrap();
        assert!((summary.normalized_savings.unwrap() + 50.0).abs() < 1e-6);

        let report = fs::read_to_string(&summary.report).unwrap();
        assert!(
            report.contains("1,2023,2022,oil,300.00,400.00,100.00,25.00,100.00,-50.00,500.00,800.00\n"),
            "{report}"
        );
    }

    #[test]
    fn single_year_has_nothing_to_compare() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        write(
            &cfg.paths.utility_costs(),
            "date,electricity_cost,oil_cost\n2023-01-01,160.00,\n2023-02-01,150.00,\n",
        );

        assert!(matches!(run(&cfg), Err(StageError::Empty(_))));
    }
}
