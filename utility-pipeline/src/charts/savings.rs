use std::path::Path;

use plotters::prelude::*;
use utility_model::domain::SavingsRecord;

use super::{
    calendar_month_label, chart_builder, draw_failed, prepare, value_range, ChartError, LABELS,
    SIZE,
};

const SAVED: RGBColor = RGBColor(44, 160, 44);
const OVERSPENT: RGBColor = RGBColor(214, 39, 40);
const RUNNING: RGBColor = RGBColor(0, 0, 139);

/// Absolute savings per calendar month as bars, with the running total as a
/// line. `rows` should hold one series for one year pair.
pub fn render_savings(path: &Path, rows: &[SavingsRecord]) -> Result<(), ChartError> {
    if rows.is_empty() {
        return Err(ChartError::new(path, "no savings rows"));
    }
    prepare(path)?;

    let slot = |r: &SavingsRecord| f64::from(u8::from(r.month) - 1);
    let y_range = value_range(rows.iter().flat_map(|r| [r.absolute_savings, r.running_total]));
    let title = format!(
        "{} {} savings compared to {}",
        rows[0].current_year, rows[0].fuel, rows[0].prior_year
    );

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_failed(path))?;

    let mut chart = chart_builder(&root, &title)
        .build_cartesian_2d(-0.5..11.5, y_range)
        .map_err(draw_failed(path))?;

    let x_fmt = |x: &f64| calendar_month_label(*x);
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh().x_labels(12).x_label_formatter(&x_fmt);
    if LABELS {
        mesh.y_desc("Savings ($)");
    }
    mesh.draw().map_err(draw_failed(path))?;

    chart
        .draw_series(rows.iter().map(|r| {
            let x = slot(r);
            let color = if r.absolute_savings >= 0.0 { SAVED } else { OVERSPENT };
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, r.absolute_savings)], color.mix(0.7).filled())
        }))
        .map_err(draw_failed(path))?
        .label("monthly savings")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], SAVED.filled()));

    chart
        .draw_series(LineSeries::new(
            rows.iter().map(|r| (slot(r), r.running_total)),
            RUNNING.stroke_width(2),
        ))
        .map_err(draw_failed(path))?
        .label("running total")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RUNNING));

    chart
        .draw_series(
            rows.iter()
                .map(|r| Circle::new((slot(r), r.running_total), 4, RUNNING.filled())),
        )
        .map_err(draw_failed(path))?;

    chart
        .draw_series(LineSeries::new([(-0.5, 0.0), (11.5, 0.0)], BLACK.mix(0.3)))
        .map_err(draw_failed(path))?;

    if LABELS {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_failed(path))?;
    }

    root.present().map_err(draw_failed(path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;
    use utility_model::domain::CostComponent;

    fn row(month: Month, absolute: f64, running: f64) -> SavingsRecord {
        SavingsRecord {
            month,
            current_year: 2024,
            prior_year: 2023,
            fuel: CostComponent::Total,
            current_year_cost: 100.0,
            prior_year_cost: 100.0 + absolute,
            absolute_savings: absolute,
            percent_savings: None,
            running_total: running,
            normalized_savings: None,
            current_degree_days: None,
            prior_degree_days: None,
        }
    }

    #[test]
    fn savings_png_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("savings_analysis.png");
        let rows = vec![
            row(Month::January, 40.0, 40.0),
            row(Month::February, -15.0, 25.0),
            row(Month::March, 10.0, 35.0),
        ];
        render_savings(&path, &rows).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn no_rows_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(render_savings(&dir.path().join("s.png"), &[]).is_err());
    }
}
