use std::path::PathBuf;

use utility_model::tables::{self, efficiency};

use super::require_input;
use crate::{
    analysis::{recent_window, yearly_summary},
    config::AppConfig,
    error::StageError,
};

/// Summarize the most recent window of efficiency metrics per year and
/// series into `efficiency_summary.csv`. Returns the path written.
pub fn run(cfg: &AppConfig) -> Result<PathBuf, StageError> {
    let metrics_path = cfg.paths.efficiency_metrics();
    require_input(&metrics_path, "compute-efficiency")?;

    let metrics = efficiency::read_metrics(&metrics_path)?;
    if metrics.is_empty() {
        return Err(StageError::Empty(format!("{} has no metrics", metrics_path.display())));
    }

    let window = recent_window(&metrics, cfg.efficiency.summary_window_months);
    let summary = yearly_summary(&window);

    for s in &summary {
        tracing::info!(
            year = s.year,
            fuel = %s.fuel,
            months = s.months,
            mean_cost_per_dd = format!("{:.2}", s.mean_cost_per_dd),
            annual_cost_per_dd = ?s.annual_cost_per_dd,
            "efficiency summary"
        );
    }

    let out = cfg.paths.output(tables::EFFICIENCY_SUMMARY);
    efficiency::write_summary(&out, &summary)?;
    tracing::info!(
        path = %out.display(),
        window_months = cfg.efficiency.summary_window_months,
        rows = summary.len(),
        "wrote efficiency summary"
    );
    Ok(out)
}
