use std::collections::{BTreeSet, HashMap};

use time::{Date, Month};
use utility_model::domain::{
    CostComponent, DegreeDayBasis, MonthlyCostRecord, SavingsRecord, WeatherRecord,
};

/// Compare each calendar month with the same month one year earlier, for
/// every series and every pair of consecutive years present in `costs`.
///
/// A month is compared only when both years have a cost for the series.
/// Rows come out ordered by (current year, series, month); the running
/// total restarts for each (current year, series).
pub fn monthly_savings(
    costs: &[MonthlyCostRecord],
    weather: Option<&[WeatherRecord]>,
) -> Vec<SavingsRecord> {
    let by_month: HashMap<(i32, Month), &MonthlyCostRecord> =
        costs.iter().map(|c| ((c.date.year(), c.date.month()), c)).collect();
    let degree_days: HashMap<Date, &WeatherRecord> = weather
        .unwrap_or_default()
        .iter()
        .map(|w| (w.date, w))
        .collect();
    let years: BTreeSet<i32> = costs.iter().map(|c| c.date.year()).collect();

    let mut rows = Vec::new();
    for &current_year in &years {
        let prior_year = current_year - 1;
        if !years.contains(&prior_year) {
            continue;
        }

        for fuel in CostComponent::ALL {
            let basis = DegreeDayBasis::for_component(fuel);
            let mut running_total = 0.0;

            for month_no in 1..=12u8 {
                let Ok(month) = Month::try_from(month_no) else {
                    continue;
                };
                let (Some(current), Some(prior)) = (
                    by_month.get(&(current_year, month)),
                    by_month.get(&(prior_year, month)),
                ) else {
                    continue;
                };
                let (Some(current_cost), Some(prior_cost)) =
                    (current.component(fuel), prior.component(fuel))
                else {
                    continue;
                };

                let absolute_savings = prior_cost - current_cost;
                running_total += absolute_savings;

                let percent_savings = if absolute_savings == 0.0 {
                    Some(0.0)
                } else {
                    (prior_cost != 0.0).then(|| absolute_savings / prior_cost * 100.0)
                };

                let dd_current = degree_days.get(&current.date).map(|w| w.degree_days(basis));
                let dd_prior = degree_days.get(&prior.date).map(|w| w.degree_days(basis));
                let normalized_savings = match (dd_prior, dd_current) {
                    (Some(p), Some(c)) if p > 0.0 && c > 0.0 => {
                        Some((prior_cost / p - current_cost / c) * c)
                    }
                    _ => None,
                };

                rows.push(SavingsRecord {
                    month,
                    current_year,
                    prior_year,
                    fuel,
                    current_year_cost: current_cost,
                    prior_year_cost: prior_cost,
                    absolute_savings,
                    percent_savings,
                    running_total,
                    normalized_savings,
                    current_degree_days: dd_current,
                    prior_degree_days: dd_prior,
                });
            }
        }
    }
    rows
}
