use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use plotters::prelude::*;
use time::{Date, Month};
use utility_model::domain::{CostComponent, EfficiencyRecord, MonthlyCostRecord};

use super::{
    calendar_month_label, chart_builder, draw_failed, prepare, series_color, value_range,
    ChartError, FONT, LABELS, SIZE,
};

/// Electricity and oil stacked in one bar; an absent fuel counts as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackedMonth {
    pub month: Month,
    pub electricity: f64,
    pub oil: f64,
}

impl StackedMonth {
    pub fn total(&self) -> f64 {
        self.electricity + self.oil
    }
}

pub type YearlyBars = BTreeMap<i32, Vec<StackedMonth>>;

fn push(by_year: &mut YearlyBars, date: Date, electricity: f64, oil: f64) {
    by_year.entry(date.year()).or_default().push(StackedMonth {
        month: date.month(),
        electricity,
        oil,
    });
}

/// Billed months grouped by year. Months with no bill for either fuel are
/// left out.
pub fn yearly_costs(costs: &[MonthlyCostRecord]) -> YearlyBars {
    let mut by_year = YearlyBars::new();
    for c in costs.iter().filter(|c| c.total().is_some()) {
        push(
            &mut by_year,
            c.date,
            c.electricity_cost.unwrap_or(0.0),
            c.oil_cost.unwrap_or(0.0),
        );
    }
    by_year
}

/// Billed months divided by their combined heating and cooling degree-days,
/// taken from the total-series efficiency rows. Months excluded from the
/// efficiency table are left out.
pub fn yearly_costs_per_degree_day(
    costs: &[MonthlyCostRecord],
    metrics: &[EfficiencyRecord],
) -> YearlyBars {
    let degree_days: HashMap<Date, f64> = metrics
        .iter()
        .filter(|m| m.fuel == CostComponent::Total && m.degree_days > 0.0)
        .map(|m| (m.date, m.degree_days))
        .collect();

    let mut by_year = YearlyBars::new();
    for c in costs.iter().filter(|c| c.total().is_some()) {
        let Some(&dd) = degree_days.get(&c.date) else {
            continue;
        };
        push(
            &mut by_year,
            c.date,
            c.electricity_cost.unwrap_or(0.0) / dd,
            c.oil_cost.unwrap_or(0.0) / dd,
        );
    }
    by_year
}

/// `(month, latest - prior, higher of the two totals)` for every month
/// present in both of the two most recent years.
pub fn latest_deltas(by_year: &YearlyBars) -> Vec<(Month, f64, f64)> {
    let mut years = by_year.iter().rev();
    let (Some((&latest, current)), Some((&prior, previous))) = (years.next(), years.next()) else {
        return Vec::new();
    };
    if latest != prior + 1 {
        return Vec::new();
    }

    current
        .iter()
        .filter_map(|c| {
            let p = previous.iter().find(|p| p.month == c.month)?;
            Some((c.month, c.total() - p.total(), c.total().max(p.total())))
        })
        .collect()
}

fn slot(month: Month) -> f64 {
    f64::from(u8::from(month) - 1)
}

/// Bars grouped by calendar month, one stacked bar per year. The change
/// between the two latest years is marked above each month: green when it
/// fell, red when it rose.
fn render_stacked_years(
    path: &Path,
    title: &str,
    y_desc: &str,
    by_year: &YearlyBars,
    delta_decimals: usize,
) -> Result<(), ChartError> {
    if by_year.is_empty() {
        return Err(ChartError::new(path, "no cost data"));
    }
    prepare(path)?;

    let totals: Vec<f64> = by_year.values().flatten().map(StackedMonth::total).collect();
    let headroom = totals.iter().copied().fold(0.0_f64, f64::max) * 1.1;
    let y_range = value_range(totals.iter().copied().chain([headroom]));
    let marker_lift = (y_range.end - y_range.start) * 0.03;

    let group_width = 0.8;
    let bar_width = group_width / by_year.len() as f64;

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_failed(path))?;

    let mut chart = chart_builder(&root, title)
        .build_cartesian_2d(-0.5..11.5, y_range)
        .map_err(draw_failed(path))?;

    let x_fmt = |x: &f64| calendar_month_label(*x);
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh().x_labels(12).x_label_formatter(&x_fmt);
    if LABELS {
        mesh.y_desc(y_desc);
    }
    mesh.draw().map_err(draw_failed(path))?;

    let years = by_year.len() as f64;
    for (i, (year, months)) in by_year.iter().enumerate() {
        // Later years are drawn in stronger shades of the fuel colors.
        let shade = 0.45 + 0.55 * (i as f64 + 1.0) / years;
        let electricity = series_color(CostComponent::Electricity).mix(shade).filled();
        let oil = series_color(CostComponent::Oil).mix(shade).filled();
        let offset = -group_width / 2.0 + bar_width * i as f64;

        chart
            .draw_series(months.iter().map(|m| {
                let x0 = slot(m.month) + offset;
                Rectangle::new([(x0, 0.0), (x0 + bar_width, m.electricity)], electricity)
            }))
            .map_err(draw_failed(path))?
            .label(format!("Electricity {year}"))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], electricity));

        chart
            .draw_series(months.iter().map(|m| {
                let x0 = slot(m.month) + offset;
                Rectangle::new([(x0, m.electricity), (x0 + bar_width, m.total())], oil)
            }))
            .map_err(draw_failed(path))?
            .label(format!("Oil {year}"))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], oil));
    }

    let deltas = latest_deltas(by_year);
    let delta_color = |delta: f64| if delta < 0.0 { GREEN } else { RED };
    chart
        .draw_series(deltas.iter().map(|&(month, delta, top)| {
            TriangleMarker::new((slot(month), top + marker_lift), 6, delta_color(delta).filled())
        }))
        .map_err(draw_failed(path))?;

    if LABELS {
        chart
            .draw_series(deltas.iter().map(|&(month, delta, top)| {
                Text::new(
                    format!("Δ ${delta:.delta_decimals$}"),
                    (slot(month) - 0.3, top + marker_lift * 2.0),
                    (FONT, 14.0).into_font().color(&delta_color(delta)),
                )
            }))
            .map_err(draw_failed(path))?;

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

/// Monthly cost by year, electricity and oil stacked.
pub fn render_year_comparison(path: &Path, costs: &[MonthlyCostRecord]) -> Result<(), ChartError> {
    render_stacked_years(
        path,
        "Monthly utility costs by year",
        "Cost ($)",
        &yearly_costs(costs),
        0,
    )
}

/// Monthly cost per combined degree-day by year, electricity and oil stacked.
pub fn render_normalized_year_comparison(
    path: &Path,
    costs: &[MonthlyCostRecord],
    metrics: &[EfficiencyRecord],
) -> Result<(), ChartError> {
    render_stacked_years(
        path,
        "Monthly cost per degree-day by year",
        "Cost per degree-day ($)",
        &yearly_costs_per_degree_day(costs, metrics),
        2,
    )
}
