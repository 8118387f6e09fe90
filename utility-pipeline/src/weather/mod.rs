//! Daily weather retrieval and degree-day aggregation.

use time::Date;
use utility_model::domain::DailyObservation;

pub mod degree_days;
pub mod open_meteo;

pub use degree_days::aggregate_monthly;
pub use open_meteo::OpenMeteoClient;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(thiserror::Error, Debug)]
pub enum WeatherError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("weather request failed: {0}")]
    Request(String),
    #[error("weather service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unreadable weather response: {0}")]
    Decode(String),
    #[error("no weather data returned for {start} to {end}")]
    NoData { start: Date, end: Date },
}

/// A provider of daily observations for a location.
#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    /// Observations for every available day in `start..=end`.
    async fn fetch_daily(
        &self,
        location: Location,
        start: Date,
        end: Date,
    ) -> Result<Vec<DailyObservation>, WeatherError>;
}
