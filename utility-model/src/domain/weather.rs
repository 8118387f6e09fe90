use time::Date;

use super::efficiency::DegreeDayBasis;

/// One day of observations from the weather archive. Any measurement may be
/// missing for a station/day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyObservation {
    pub date: Date,
    pub avg_temp: Option<f64>,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub precipitation: Option<f64>,
    pub snow: Option<f64>,
}

/// A row of `weather_data.csv`: one calendar month of aggregated weather.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub date: Date,
    pub avg_temp: f64,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub precipitation: f64,
    pub snow: f64,
    pub hdd: f64,
    pub cdd: f64,
}

impl WeatherRecord {
    pub fn degree_days(&self, basis: DegreeDayBasis) -> f64 {
        match basis {
            DegreeDayBasis::Heating => self.hdd,
            DegreeDayBasis::Cooling => self.cdd,
            DegreeDayBasis::Total => self.hdd + self.cdd,
        }
    }
}
