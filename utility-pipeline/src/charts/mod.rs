//! PNG charts rendered with plotters' bitmap backend.
//!
//! Months are plotted on a numeric axis (`month_index`), since plotters'
//! date axes are tied to chrono. Text (captions, tick labels, legends) is
//! only drawn when the crate is built with the `chart-labels` feature:
//! without a font backend plotters cannot draw text at all.

use std::{
    fmt::Display,
    ops::Range,
    path::{Path, PathBuf},
};

use plotters::{
    coord::Shift,
    prelude::{ChartBuilder, DrawingArea, DrawingBackend, IntoFont},
    style::RGBColor,
};
use time::Month;
use utility_model::domain::{month::month_label, CostComponent};

pub mod costs;
pub mod efficiency;
pub mod savings;
pub mod years;

pub use costs::render_cost_comparison;
pub use efficiency::render_efficiency_comparison;
pub use savings::render_savings;
pub use years::{render_normalized_year_comparison, render_year_comparison};

pub const COST_COMPARISON: &str = "cost_comparison.png";
pub const EFFICIENCY_COMPARISON: &str = "efficiency_comparison.png";
pub const YEAR_COMPARISON: &str = "year_comparison.png";
pub const NORMALIZED_YEAR_COMPARISON: &str = "year_comparison_normalized.png";
pub const SAVINGS_ANALYSIS: &str = "savings_analysis.png";

const SIZE: (u32, u32) = (1200, 700);
const FONT: &str = "sans-serif";
const LABELS: bool = cfg!(feature = "chart-labels");

#[derive(thiserror::Error, Debug)]
#[error("failed to render {}: {reason}", .path.display())]
pub struct ChartError {
    pub path: PathBuf,
    pub reason: String,
}

impl ChartError {
    fn new(path: &Path, reason: impl Into<String>) -> Self {
        Self { path: path.to_path_buf(), reason: reason.into() }
    }
}

fn draw_failed<E: Display>(path: &Path) -> impl Fn(E) -> ChartError + '_ {
    move |e| ChartError::new(path, e.to_string())
}

fn prepare(path: &Path) -> Result<(), ChartError> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => std::fs::create_dir_all(parent).map_err(draw_failed(path)),
        None => Ok(()),
    }
}

/// Builder with the common margins; caption and label areas only when text
/// can be drawn.
fn chart_builder<'a, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, Shift>,
    title: &str,
) -> ChartBuilder<'a, 'static, DB> {
    let mut builder = ChartBuilder::on(root);
    builder.margin(20);
    if LABELS {
        builder
            .caption(title, (FONT, 24.0).into_font())
            .x_label_area_size(40)
            .y_label_area_size(60);
    }
    builder
}

fn series_color(component: CostComponent) -> RGBColor {
    match component {
        CostComponent::Electricity => RGBColor(31, 119, 180),
        CostComponent::Oil => RGBColor(214, 39, 40),
        CostComponent::Total => RGBColor(44, 160, 44),
    }
}

/// Axis range covering `values` and zero, padded by 5%.
fn value_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((hi - lo) * 0.05).max(1e-6);
    let lo = if lo < 0.0 { lo - pad } else { lo };
    (lo)..(hi + pad)
}

/// `YYYY-MM` for a month index tick.
fn month_axis_label(x: f64) -> String {
    let idx = x.round() as i32;
    format!("{}-{:02}", idx.div_euclid(12), idx.rem_euclid(12) + 1)
}

/// `Jan`..`Dec` for a calendar-month slot (0-based) tick.
fn calendar_month_label(x: f64) -> String {
    let slot = x.round();
    if !(0.0..12.0).contains(&slot) {
        return String::new();
    }
    Month::try_from(slot as u8 + 1)
        .map(|m| month_label(m).to_string())
        .unwrap_or_default()
}

/// Split `(month_index, value)` points into runs of consecutive months so
/// gaps are not drawn across.
fn contiguous_runs(points: &[(i32, f64)]) -> Vec<Vec<(f64, f64)>> {
    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut last: Option<i32> = None;
    for &(idx, value) in points {
        match (last, runs.last_mut()) {
            (Some(prev), Some(run)) if idx == prev + 1 => run.push((f64::from(idx), value)),
            _ => runs.push(vec![(f64::from(idx), value)]),
        }
        last = Some(idx);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_break_at_gaps() {
        let runs = contiguous_runs(&[(10, 1.0), (11, 2.0), (13, 3.0)]);
        assert_eq!(runs, vec![vec![(10.0, 1.0), (11.0, 2.0)], vec![(13.0, 3.0)]]);
        assert!(contiguous_runs(&[]).is_empty());
    }

    #[test]
    fn value_range_includes_zero_and_negatives() {
        let r = value_range([5.0, 10.0]);
        assert_eq!(r.start, 0.0);
        assert!(r.end > 10.0);

        let r = value_range([-20.0, 10.0]);
        assert!(r.start < -20.0);

        let r = value_range(std::iter::empty());
        assert!(r.end > r.start);
    }

    #[test]
    fn month_labels_round_trip_index() {
        assert_eq!(month_axis_label((2023 * 12) as f64), "2023-01");
        assert_eq!(month_axis_label((2023 * 12 + 11) as f64), "2023-12");
    }

    #[test]
    fn calendar_labels_only_for_real_months() {
        assert_eq!(calendar_month_label(0.0), "Jan");
        assert_eq!(calendar_month_label(11.2), "Dec");
        assert_eq!(calendar_month_label(-1.0), "");
        assert_eq!(calendar_month_label(12.0), "");
    }
}
