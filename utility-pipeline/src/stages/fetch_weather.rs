use time::{Date, Month};
use utility_model::{
    domain::month::{month_end, month_start},
    tables::{costs, weather},
};

use super::require_input;
use crate::{
    config::AppConfig,
    error::StageError,
    weather::{aggregate_monthly, Location, WeatherSource},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub chunks: usize,
    pub failed_chunks: usize,
    pub days: usize,
    pub months: usize,
}

/// Split `start..=end` at calendar-year boundaries.
pub fn yearly_chunks(start: Date, end: Date) -> Vec<(Date, Date)> {
    let mut chunks = Vec::new();
    for year in start.year()..=end.year() {
        let (Ok(jan_1), Ok(dec_31)) = (
            Date::from_calendar_date(year, Month::January, 1),
            Date::from_calendar_date(year, Month::December, 31),
        ) else {
            continue;
        };
        let from = start.max(jan_1);
        let to = end.min(dec_31);
        if from <= to {
            chunks.push((from, to));
        }
    }
    chunks
}

/// Fetch daily weather for the month span of the cost table and write the
/// monthly aggregate. `today` bounds the range; no future days are requested.
pub async fn run<W>(cfg: &AppConfig, source: &W, today: Date) -> Result<FetchSummary, StageError>
where
    W: WeatherSource + ?Sized,
{
    let (latitude, longitude) = cfg.location()?;
    let location = Location { latitude, longitude };

    let costs_path = cfg.paths.utility_costs();
    require_input(&costs_path, "normalize")?;
    let cost_rows = costs::read(&costs_path)?;
    let (Some(first), Some(last)) = (cost_rows.first(), cost_rows.last()) else {
        return Err(StageError::Empty(format!("{} has no months", costs_path.display())));
    };

    let start = month_start(first.date);
    let end = month_end(last.date).min(today);
    if start > end {
        return Err(StageError::Empty(format!(
            "cost table starts {start}, after today ({today})"
        )));
    }

    let chunks = yearly_chunks(start, end);
    let mut days = Vec::new();
    let mut failed = 0;
    for &(from, to) in &chunks {
        match source.fetch_daily(location, from, to).await {
            Ok(mut chunk) => {
                tracing::info!(start = %from, end = %to, days = chunk.len(), "fetched weather chunk");
                days.append(&mut chunk);
            }
            Err(e) => {
                failed += 1;
                metrics::counter!("weather_chunks_failed_total").increment(1);
                tracing::error!(start = %from, end = %to, error = %e, "weather chunk failed");
            }
        }
    }

    if failed == chunks.len() {
        return Err(StageError::External(format!(
            "every weather request failed for {start} to {end}"
        )));
    }

    let monthly = aggregate_monthly(&days, cfg.base_temp_c);
    let out = cfg.paths.weather_data();
    weather::write(&out, &monthly)?;

    let summary = FetchSummary {
        chunks: chunks.len(),
        failed_chunks: failed,
        days: days.len(),
        months: monthly.len(),
    };
    tracing::info!(
        path = %out.display(),
        months = summary.months,
        days = summary.days,
        failed_chunks = summary.failed_chunks,
        base_temp_c = cfg.base_temp_c,
        "wrote monthly weather"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        stages::testutil::{config_in, write},
        weather::WeatherError,
    };
    use std::sync::Mutex;
    use time::macros::date;
    use utility_model::domain::DailyObservation;

    /// Constant 10 °C every day; fails any chunk starting in `fail_year`.
    struct FakeArchive {
        fail_year: Option<i32>,
        requests: Mutex<Vec<(Date, Date)>>,
    }

    impl FakeArchive {
        fn new(fail_year: Option<i32>) -> Self {
            Self { fail_year, requests: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait::async_trait]
    impl WeatherSource for FakeArchive {
        async fn fetch_daily(
            &self,
            _location: Location,
            start: Date,
            end: Date,
        ) -> Result<Vec<DailyObservation>, WeatherError> {
            self.requests.lock().unwrap().push((start, end));
            if Some(start.year()) == self.fail_year {
                return Err(WeatherError::Status { status: 500, body: "boom".into() });
            }
            let mut days = Vec::new();
            let mut d = start;
            while d <= end {
                days.push(DailyObservation {
                    date: d,
                    avg_temp: Some(10.0),
                    min_temp: Some(5.0),
                    max_temp: Some(15.0),
                    precipitation: Some(1.0),
                    snow: None,
                });
                d = d.next_day().unwrap();
            }
            Ok(days)
        }
    }

    fn costs(cfg: &AppConfig) {
        write(
            &cfg.paths.utility_costs(),
            "date,electricity_cost,oil_cost\n2022-11-01,100.00,\n2022-12-01,,300.00\n2023-01-01,120.00,\n",
        );
    }

    #[test]
    fn chunks_follow_calendar_years() {
        assert_eq!(
            yearly_chunks(date!(2022 - 11 - 01), date!(2024 - 02 - 29)),
            vec![
                (date!(2022 - 11 - 01), date!(2022 - 12 - 31)),
                (date!(2023 - 01 - 01), date!(2023 - 12 - 31)),
                (date!(2024 - 01 - 01), date!(2024 - 02 - 29)),
            ]
        );
    }

    #[tokio::test]
    async fn writes_monthly_degree_days() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        costs(&cfg);
        let archive = FakeArchive::new(None);

        let summary = run(&cfg, &archive, date!(2024 - 06 - 01)).await.unwrap();
        assert_eq!(summary.chunks, 2);
        assert_eq!(summary.months, 3);
        assert_eq!(summary.days, 30 + 31 + 31);

        let rows = weather::read(&cfg.paths.weather_data()).unwrap();
        // 8 °C below the 18 °C base every day
        assert_eq!(rows[0].hdd, 240.0);
        assert_eq!(rows[0].cdd, 0.0);
        assert_eq!(rows[2].date, date!(2023 - 01 - 01));
    }

    #[tokio::test]
    async fn end_is_clamped_to_today() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        costs(&cfg);
        let archive = FakeArchive::new(None);

        run(&cfg, &archive, date!(2023 - 01 - 10)).await.unwrap();
        let requests = archive.requests.lock().unwrap().clone();
        assert_eq!(requests.last().unwrap().1, date!(2023 - 01 - 10));
    }

    #[tokio::test]
    async fn failed_chunk_leaves_months_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        costs(&cfg);
        let archive = FakeArchive::new(Some(2022));

        let summary = run(&cfg, &archive, date!(2024 - 06 - 01)).await.unwrap();
        assert_eq!(summary.failed_chunks, 1);
        let rows = weather::read(&cfg.paths.weather_data()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, date!(2023 - 01 - 01));
    }

    #[tokio::test]
    async fn all_chunks_failing_is_external() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        write(
            &cfg.paths.utility_costs(),
            "date,electricity_cost,oil_cost\n2022-11-01,100.00,\n",
        );
        let archive = FakeArchive::new(Some(2022));

        let err = run(&cfg, &archive, date!(2024 - 06 - 01)).await.unwrap_err();
        assert!(matches!(err, StageError::External(_)));
        assert!(!cfg.paths.weather_data().exists());
    }

    #[tokio::test]
    async fn location_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config_in(dir.path());
        cfg.latitude = None;
        costs(&cfg);

        let err = run(&cfg, &FakeArchive::new(None), date!(2024 - 06 - 01)).await.unwrap_err();
        assert!(matches!(err, StageError::Config(_)));
    }

    #[tokio::test]
    async fn missing_cost_table_names_normalize() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        let err = run(&cfg, &FakeArchive::new(None), date!(2024 - 06 - 01)).await.unwrap_err();
        assert!(err.to_string().contains("expected from normalize"));
    }
}
