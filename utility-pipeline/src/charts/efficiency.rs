use std::path::Path;

use plotters::prelude::*;
use utility_model::domain::{month::month_index, CostComponent, EfficiencyRecord};

use super::{
    chart_builder, contiguous_runs, draw_failed, month_axis_label, prepare, series_color,
    value_range, ChartError, LABELS, SIZE,
};

/// Cost per degree-day of every series on the same month axis as the cost
/// chart.
pub fn render_efficiency_comparison(
    path: &Path,
    metrics: &[EfficiencyRecord],
) -> Result<(), ChartError> {
    let Some(first) = metrics.iter().map(|m| month_index(m.date)).min() else {
        return Err(ChartError::new(path, "no efficiency data"));
    };
    let last = metrics.iter().map(|m| month_index(m.date)).max().unwrap_or(first);
    prepare(path)?;

    let x_range = f64::from(first) - 0.5..f64::from(last) + 0.5;
    let y_range = value_range(metrics.iter().map(|m| m.cost_per_degree_day));

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_failed(path))?;

    let mut chart = chart_builder(&root, "Cost per degree-day")
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_failed(path))?;

    let x_fmt = |x: &f64| month_axis_label(*x);
    let mut mesh = chart.configure_mesh();
    mesh.x_labels(12).x_label_formatter(&x_fmt);
    if LABELS {
        mesh.y_desc("$ per degree-day");
    }
    mesh.draw().map_err(draw_failed(path))?;

    for component in CostComponent::ALL {
        let mut points: Vec<(i32, f64)> = metrics
            .iter()
            .filter(|m| m.fuel == component)
            .map(|m| (month_index(m.date), m.cost_per_degree_day))
            .collect();
        if points.is_empty() {
            continue;
        }
        points.sort_by_key(|&(x, _)| x);

        let color = series_color(component);
        let label = format!("{component} ({})", component_basis(component));
        for (i, run) in contiguous_runs(&points).into_iter().enumerate() {
            let series = chart
                .draw_series(LineSeries::new(run, color.stroke_width(2)))
                .map_err(draw_failed(path))?;
            if i == 0 {
                series
                    .label(label.clone())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
        }
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((f64::from(x), y), 3, color.filled())),
            )
            .map_err(draw_failed(path))?;
    }

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

fn component_basis(component: CostComponent) -> &'static str {
    match component {
        CostComponent::Electricity => "per CDD",
        CostComponent::Oil => "per HDD",
        CostComponent::Total => "per HDD+CDD",
    }
}
