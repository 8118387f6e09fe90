use std::collections::HashMap;

use time::Date;
use utility_model::domain::{
    CostComponent, DegreeDayBasis, EfficiencyExclusion, EfficiencyRecord, ExclusionReason,
    MonthlyCostRecord, WeatherRecord,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct EfficiencyOutcome {
    pub records: Vec<EfficiencyRecord>,
    pub exclusions: Vec<EfficiencyExclusion>,
}

/// Join costs and weather on month and divide each series by its degree-day
/// basis.
///
/// A (month, series) whose degree-days are not above `min_degree_days`
/// (clamped to at least zero) or whose month has no weather row becomes an
/// exclusion instead of a metric. Absent costs produce neither.
pub fn compute_efficiency(
    costs: &[MonthlyCostRecord],
    weather: &[WeatherRecord],
    min_degree_days: f64,
) -> EfficiencyOutcome {
    let threshold = min_degree_days.max(0.0);
    let by_month: HashMap<Date, &WeatherRecord> = weather.iter().map(|w| (w.date, w)).collect();

    let mut outcome = EfficiencyOutcome::default();

    for row in costs {
        for component in CostComponent::ALL {
            let Some(cost) = row.component(component) else {
                continue;
            };
            let basis = DegreeDayBasis::for_component(component);

            let Some(w) = by_month.get(&row.date) else {
                outcome.exclusions.push(EfficiencyExclusion {
                    date: row.date,
                    fuel: component,
                    basis,
                    degree_days: None,
                    reason: ExclusionReason::NoWeatherData,
                });
                continue;
            };

            let degree_days = w.degree_days(basis);
            let cost_per_degree_day = cost / degree_days;
            if degree_days <= threshold || !cost_per_degree_day.is_finite() {
                outcome.exclusions.push(EfficiencyExclusion {
                    date: row.date,
                    fuel: component,
                    basis,
                    degree_days: Some(degree_days),
                    reason: ExclusionReason::InsufficientDegreeDays,
                });
                continue;
            }

            outcome.records.push(EfficiencyRecord {
                date: row.date,
                fuel: component,
                basis,
                degree_days,
                cost,
                cost_per_degree_day,
            });
        }
    }

    outcome.records.sort_by_key(|r| (r.date, r.fuel));
    outcome.exclusions.sort_by_key(|e| (e.date, e.fuel));
    outcome
}
