use std::path::Path;

use plotters::prelude::*;
use utility_model::domain::{month::month_index, CostComponent, Fuel, MonthlyCostRecord};

use super::{
    chart_builder, contiguous_runs, draw_failed, month_axis_label, prepare, series_color,
    value_range, ChartError, LABELS, SIZE,
};

/// Monthly electricity and oil cost on a shared time axis.
pub fn render_cost_comparison(path: &Path, costs: &[MonthlyCostRecord]) -> Result<(), ChartError> {
    let Some((first, last)) = costs.first().zip(costs.last()) else {
        return Err(ChartError::new(path, "no cost data"));
    };
    prepare(path)?;

    let x_range = f64::from(month_index(first.date)) - 0.5..f64::from(month_index(last.date)) + 0.5;
    let y_range = value_range(
        costs
            .iter()
            .flat_map(|c| [c.electricity_cost, c.oil_cost])
            .flatten(),
    );

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_failed(path))?;

    let mut chart = chart_builder(&root, "Monthly utility costs")
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_failed(path))?;

    let x_fmt = |x: &f64| month_axis_label(*x);
    let mut mesh = chart.configure_mesh();
    mesh.x_labels(12).x_label_formatter(&x_fmt);
    if LABELS {
        mesh.y_desc("Cost ($)");
    }
    mesh.draw().map_err(draw_failed(path))?;

    for fuel in Fuel::ALL {
        let color = series_color(CostComponent::from(fuel));
        let points: Vec<(i32, f64)> = costs
            .iter()
            .filter_map(|c| c.cost(fuel).map(|v| (month_index(c.date), v)))
            .collect();

        for (i, run) in contiguous_runs(&points).into_iter().enumerate() {
            let series = chart
                .draw_series(LineSeries::new(run, color.stroke_width(2)))
                .map_err(draw_failed(path))?;
            if i == 0 {
                series
                    .label(fuel.as_str())
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

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, Date};

    fn cost(date: Date, electricity: Option<f64>, oil: Option<f64>) -> MonthlyCostRecord {
        MonthlyCostRecord { date, electricity_cost: electricity, oil_cost: oil }
    }

    fn sample() -> Vec<MonthlyCostRecord> {
        vec![
            cost(date!(2022 - 11 - 01), Some(120.0), Some(380.0)),
            cost(date!(2022 - 12 - 01), Some(135.0), None),
            cost(date!(2023 - 01 - 01), None, None),
            cost(date!(2023 - 02 - 01), Some(140.0), Some(410.0)),
        ]
    }

    #[test]
    fn cost_comparison_png_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("cost_comparison.png");
        render_cost_comparison(&path, &sample()).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn empty_costs_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cost_comparison.png");
        assert!(render_cost_comparison(&path, &[]).is_err());
        assert!(!path.exists());
    }
}
