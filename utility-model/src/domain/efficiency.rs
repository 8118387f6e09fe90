use std::{fmt, str::FromStr};

use time::Date;

use super::billing::CostComponent;

/// Which degree-days a cost series is divided by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DegreeDayBasis {
    Heating,
    Cooling,
    Total,
}

impl DegreeDayBasis {
    pub fn as_str(self) -> &'static str {
        match self {
            DegreeDayBasis::Heating => "hdd",
            DegreeDayBasis::Cooling => "cdd",
            DegreeDayBasis::Total => "total_dd",
        }
    }

    /// Oil only heats, electricity carries the cooling load, and the combined
    /// bill is compared against all degree-days.
    pub fn for_component(component: CostComponent) -> Self {
        match component {
            CostComponent::Oil => DegreeDayBasis::Heating,
            CostComponent::Electricity => DegreeDayBasis::Cooling,
            CostComponent::Total => DegreeDayBasis::Total,
        }
    }
}

impl fmt::Display for DegreeDayBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DegreeDayBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "hdd" => Ok(DegreeDayBasis::Heating),
            "cdd" => Ok(DegreeDayBasis::Cooling),
            "total_dd" => Ok(DegreeDayBasis::Total),
            other => Err(format!("unknown degree-day basis '{other}'")),
        }
    }
}

/// A row of `efficiency_metrics.csv`. `cost_per_degree_day` is always finite.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyRecord {
    pub date: Date,
    pub fuel: CostComponent,
    pub basis: DegreeDayBasis,
    pub degree_days: f64,
    pub cost: f64,
    pub cost_per_degree_day: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Degree-days at or below the configured minimum (including zero).
    InsufficientDegreeDays,
    /// The cost month has no row in the weather table.
    NoWeatherData,
}

impl ExclusionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExclusionReason::InsufficientDegreeDays => "insufficient_degree_days",
            ExclusionReason::NoWeatherData => "no_weather_data",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (month, series) left out of the efficiency table, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyExclusion {
    pub date: Date,
    pub fuel: CostComponent,
    pub basis: DegreeDayBasis,
    pub degree_days: Option<f64>,
    pub reason: ExclusionReason,
}

/// A row of `efficiency_summary.csv`: statistics of one series over one year.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencySummary {
    pub year: i32,
    pub fuel: CostComponent,
    pub months: usize,
    pub mean_cost_per_dd: f64,
    /// Sample standard deviation; undefined for a single month.
    pub std_cost_per_dd: Option<f64>,
    pub min_cost_per_dd: f64,
    pub max_cost_per_dd: f64,
    pub total_cost: f64,
    pub total_degree_days: f64,
    pub annual_cost_per_dd: Option<f64>,
}
