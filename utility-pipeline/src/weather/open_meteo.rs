use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use time::Date;
use utility_model::domain::{
    month::{format_date, parse_date},
    DailyObservation,
};

use super::{Location, WeatherError, WeatherSource};
use crate::config::WeatherConfig;

const DAILY_VARIABLES: &str =
    "temperature_2m_mean,temperature_2m_min,temperature_2m_max,precipitation_sum,snowfall_sum";

/// Client for the Open-Meteo historical archive (`/v1/archive`).
///
/// Temperatures are °C, precipitation mm, snowfall cm.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    base_url: String,
    client: Client,
}

impl OpenMeteoClient {
    pub fn new(cfg: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| WeatherError::Client(e.to_string()))?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: Option<DailySeries>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DailySeries {
    time: Vec<String>,
    temperature_2m_mean: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    temperature_2m_max: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    snowfall_sum: Vec<Option<f64>>,
}

impl DailySeries {
    fn into_observations(self) -> Result<Vec<DailyObservation>, WeatherError> {
        let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

        self.time
            .iter()
            .enumerate()
            .map(|(i, day)| {
                Ok(DailyObservation {
                    date: parse_date(day).map_err(WeatherError::Decode)?,
                    avg_temp: at(&self.temperature_2m_mean, i),
                    min_temp: at(&self.temperature_2m_min, i),
                    max_temp: at(&self.temperature_2m_max, i),
                    precipitation: at(&self.precipitation_sum, i),
                    snow: at(&self.snowfall_sum, i),
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn fetch_daily(
        &self,
        location: Location,
        start: Date,
        end: Date,
    ) -> Result<Vec<DailyObservation>, WeatherError> {
        tracing::info!(
            latitude = location.latitude,
            longitude = location.longitude,
            start = %start,
            end = %end,
            "fetching daily weather"
        );

        let url = format!("{}/v1/archive", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("start_date", format_date(start)),
                ("end_date", format_date(end)),
                ("daily", DAILY_VARIABLES.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Status { status: status.as_u16(), body });
        }

        let parsed: ArchiveResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Decode(e.to_string()))?;

        let days = parsed
            .daily
            .map(DailySeries::into_observations)
            .transpose()?
            .unwrap_or_default();

        if days.is_empty() {
            return Err(WeatherError::NoData { start, end });
        }
        Ok(days)
    }
}
