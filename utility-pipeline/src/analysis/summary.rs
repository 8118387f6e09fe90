use std::collections::BTreeMap;

use utility_model::domain::{month::month_index, CostComponent, EfficiencyRecord, EfficiencySummary};

/// Records within the `months` calendar months ending at the latest record.
pub fn recent_window(records: &[EfficiencyRecord], months: usize) -> Vec<EfficiencyRecord> {
    let Some(latest) = records.iter().map(|r| month_index(r.date)).max() else {
        return Vec::new();
    };
    let span = i32::try_from(months).unwrap_or(i32::MAX);
    records
        .iter()
        .filter(|r| latest - month_index(r.date) < span)
        .cloned()
        .collect()
}

fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Per (year, series) statistics of cost per degree-day, ordered by year
/// then series.
pub fn yearly_summary(records: &[EfficiencyRecord]) -> Vec<EfficiencySummary> {
    let mut groups: BTreeMap<(i32, CostComponent), Vec<&EfficiencyRecord>> = BTreeMap::new();
    for r in records {
        groups.entry((r.date.year(), r.fuel)).or_default().push(r);
    }

    groups
        .into_iter()
        .map(|((year, fuel), rows)| {
            let values: Vec<f64> = rows.iter().map(|r| r.cost_per_degree_day).collect();
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let total_cost: f64 = rows.iter().map(|r| r.cost).sum();
            let total_degree_days: f64 = rows.iter().map(|r| r.degree_days).sum();

            EfficiencySummary {
                year,
                fuel,
                months: rows.len(),
                mean_cost_per_dd: mean,
                std_cost_per_dd: sample_std(&values, mean),
                min_cost_per_dd: values.iter().copied().fold(f64::INFINITY, f64::min),
                max_cost_per_dd: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                total_cost,
                total_degree_days,
                annual_cost_per_dd: (total_degree_days > 0.0)
                    .then(|| total_cost / total_degree_days),
            }
        })
        .collect()
}
