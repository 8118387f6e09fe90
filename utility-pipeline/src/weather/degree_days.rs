use std::collections::BTreeMap;

use time::Date;
use utility_model::domain::{month::month_start, DailyObservation, WeatherRecord};

pub fn heating_degree_days(avg_temp: f64, base_temp: f64) -> f64 {
    (base_temp - avg_temp).max(0.0)
}

pub fn cooling_degree_days(avg_temp: f64, base_temp: f64) -> f64 {
    (avg_temp - base_temp).max(0.0)
}

#[derive(Default)]
struct MonthAccumulator {
    temp_days: usize,
    temp_sum: f64,
    min_temp: Option<f64>,
    max_temp: Option<f64>,
    precipitation: f64,
    snow: f64,
    hdd: f64,
    cdd: f64,
}

/// Roll daily observations up to calendar months.
///
/// - avg_temp: mean of the daily means
/// - min_temp / max_temp: lowest daily minimum / highest daily maximum
/// - precipitation, snow, hdd, cdd: sums
///
/// Days without a mean temperature contribute no degree-days. A month with
/// no such day at all is left out rather than estimated.
pub fn aggregate_monthly(days: &[DailyObservation], base_temp: f64) -> Vec<WeatherRecord> {
    let mut months: BTreeMap<Date, MonthAccumulator> = BTreeMap::new();

    for day in days {
        let acc = months.entry(month_start(day.date)).or_default();

        if let Some(avg) = day.avg_temp {
            acc.temp_days += 1;
            acc.temp_sum += avg;
            acc.hdd += heating_degree_days(avg, base_temp);
            acc.cdd += cooling_degree_days(avg, base_temp);
        }
        if let Some(min) = day.min_temp {
            acc.min_temp = Some(acc.min_temp.map_or(min, |m| m.min(min)));
        }
        if let Some(max) = day.max_temp {
            acc.max_temp = Some(acc.max_temp.map_or(max, |m| m.max(max)));
        }
        acc.precipitation += day.precipitation.unwrap_or(0.0);
        acc.snow += day.snow.unwrap_or(0.0);
    }

    months
        .into_iter()
        .filter_map(|(date, acc)| {
            if acc.temp_days == 0 {
                tracing::warn!(month = %date, "no daily mean temperatures, month left out");
                return None;
            }
            Some(WeatherRecord {
                date,
                avg_temp: acc.temp_sum / acc.temp_days as f64,
                min_temp: acc.min_temp,
                max_temp: acc.max_temp,
                precipitation: acc.precipitation,
                snow: acc.snow,
                hdd: acc.hdd,
                cdd: acc.cdd,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, Duration};

    fn day(date: Date, avg: Option<f64>) -> DailyObservation {
        DailyObservation {
            date,
            avg_temp: avg,
            min_temp: avg.map(|a| a - 4.0),
            max_temp: avg.map(|a| a + 4.0),
            precipitation: Some(1.5),
            snow: None,
        }
    }

    fn run_of_days(start: Date, temps: &[f64]) -> Vec<DailyObservation> {
        temps
            .iter()
            .enumerate()
            .map(|(i, t)| day(start + Duration::days(i as i64), Some(*t)))
            .collect()
    }

    #[test]
    fn daily_degree_days_are_clamped_at_zero() {
        assert_eq!(heating_degree_days(10.0, 18.0), 8.0);
        assert_eq!(heating_degree_days(20.0, 18.0), 0.0);
        assert_eq!(cooling_degree_days(20.0, 18.0), 2.0);
        assert_eq!(cooling_degree_days(10.0, 18.0), 0.0);
    }

    #[test]
    fn monthly_sums_and_means() {
        let days = run_of_days(date!(2023 - 01 - 30), &[2.0, 4.0, 21.0, 15.0]);
        let monthly = aggregate_monthly(&days, 18.0);

        assert_eq!(monthly.len(), 2);
        let jan = &monthly[0];
        assert_eq!(jan.date, date!(2023 - 01 - 01));
        assert_eq!(jan.avg_temp, 3.0);
        assert_eq!(jan.hdd, 16.0 + 14.0);
        assert_eq!(jan.cdd, 0.0);
        assert_eq!(jan.min_temp, Some(-2.0));
        assert_eq!(jan.max_temp, Some(8.0));
        assert_eq!(jan.precipitation, 3.0);

        let feb = &monthly[1];
        assert_eq!(feb.hdd, 3.0);
        assert_eq!(feb.cdd, 3.0);
    }

    #[test]
    fn warm_month_has_no_heating_degree_days() {
        let temps: Vec<f64> = (0..31).map(|i| 18.0 + (i % 5) as f64).collect();
        let monthly = aggregate_monthly(&run_of_days(date!(2023 - 07 - 01), &temps), 18.0);

        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].hdd, 0.0);
        assert!(monthly[0].cdd > 0.0);
    }

    #[test]
    fn degree_days_are_never_negative() {
        let temps: Vec<f64> = (0..90).map(|i| -25.0 + i as f64 * 0.7).collect();
        let monthly = aggregate_monthly(&run_of_days(date!(2023 - 03 - 01), &temps), 16.5);
        assert!(monthly.iter().all(|m| m.hdd >= 0.0 && m.cdd >= 0.0));
    }

    #[test]
    fn month_without_mean_temperatures_is_absent() {
        let days = vec![
            day(date!(2023 - 04 - 01), None),
            day(date!(2023 - 04 - 02), None),
            day(date!(2023 - 05 - 01), Some(12.0)),
        ];
        let monthly = aggregate_monthly(&days, 18.0);
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].date, date!(2023 - 05 - 01));
    }
}
