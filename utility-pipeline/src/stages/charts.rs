use std::path::PathBuf;

use utility_model::tables::{costs, efficiency};

use super::require_input;
use crate::{
    charts::{
        render_cost_comparison, render_efficiency_comparison, render_normalized_year_comparison,
        render_year_comparison, years::yearly_costs_per_degree_day, COST_COMPARISON,
        EFFICIENCY_COMPARISON, NORMALIZED_YEAR_COMPARISON, YEAR_COMPARISON,
    },
    config::AppConfig,
    error::StageError,
};

/// Render the cost, year (raw and per degree-day) and efficiency comparison
/// charts. Returns the files written.
pub fn run(cfg: &AppConfig) -> Result<Vec<PathBuf>, StageError> {
    let costs_path = cfg.paths.utility_costs();
    let metrics_path = cfg.paths.efficiency_metrics();
    require_input(&costs_path, "normalize")?;
    require_input(&metrics_path, "compute-efficiency")?;

    let cost_rows = costs::read(&costs_path)?;
    let metrics = efficiency::read_metrics(&metrics_path)?;
    if cost_rows.is_empty() {
        return Err(StageError::Empty(format!("{} has no months", costs_path.display())));
    }

    let mut written = Vec::new();

    let path = cfg.paths.output(COST_COMPARISON);
    render_cost_comparison(&path, &cost_rows)?;
    written.push(path);

    let path = cfg.paths.output(YEAR_COMPARISON);
    render_year_comparison(&path, &cost_rows)?;
    written.push(path);

    if metrics.is_empty() {
        tracing::warn!(
            path = %metrics_path.display(),
            "no efficiency metrics, skipping efficiency chart"
        );
    } else {
        let path = cfg.paths.output(EFFICIENCY_COMPARISON);
        render_efficiency_comparison(&path, &metrics)?;
        written.push(path);
    }

    if yearly_costs_per_degree_day(&cost_rows, &metrics).is_empty() {
        tracing::warn!(
            path = %metrics_path.display(),
            "no combined degree-days for any billed month, skipping normalized year chart"
        );
    } else {
        let path = cfg.paths.output(NORMALIZED_YEAR_COMPARISON);
        render_normalized_year_comparison(&path, &cost_rows, &metrics)?;
        written.push(path);
    }

    for path in &written {
        tracing::info!(path = %path.display(), "wrote chart");
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testutil::{config_in, write};

    #[test]
    fn renders_every_chart() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        write(
            &cfg.paths.utility_costs(),
            "date,electricity_cost,oil_cost\n\
             2022-01-01,145.50,420.00\n\
             2022-02-01,130.00,380.00\n\
             2023-01-01,160.00,400.00\n",
        );
        write(
            &cfg.paths.efficiency_metrics(),
            "date,fuel,basis,degree_days,cost,cost_per_degree_day\n\
             2022-01-01,oil,hdd,600.00,420.00,0.7000\n\
             2022-01-01,total,total_dd,600.00,565.50,0.9425\n\
             2022-02-01,oil,hdd,500.00,380.00,0.7600\n\
             2022-02-01,total,total_dd,500.00,510.00,1.0200\n\
             2023-01-01,total,total_dd,640.00,560.00,0.8750\n",
        );

        let written = run(&cfg).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                COST_COMPARISON,
                YEAR_COMPARISON,
                EFFICIENCY_COMPARISON,
                NORMALIZED_YEAR_COMPARISON
            ]
        );
        for path in written {
            assert!(path.exists(), "{}", path.display());
        }
    }

    #[test]
    fn empty_metrics_skip_efficiency_chart() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        write(
            &cfg.paths.utility_costs(),
            "date,electricity_cost,oil_cost\n2023-01-01,160.00,\n",
        );
        write(
            &cfg.paths.efficiency_metrics(),
            "date,fuel,basis,degree_days,cost,cost_per_degree_day\n",
        );

        let written = run(&cfg).unwrap();
        assert_eq!(written.len(), 2);
        assert!(!cfg.paths.output(EFFICIENCY_COMPARISON).exists());
        assert!(!cfg.paths.output(NORMALIZED_YEAR_COMPARISON).exists());
    }

    #[test]
    fn missing_metrics_names_compute_efficiency() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        write(&cfg.paths.utility_costs(), "date,electricity_cost,oil_cost\n");

        let err = run(&cfg).unwrap_err();
        assert!(err.to_string().contains("compute-efficiency"));
    }
}
