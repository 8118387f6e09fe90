use time::Month;

use super::billing::CostComponent;

/// A row of `monthly_savings.csv`: one calendar month of one series compared
/// against the same month a year earlier.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsRecord {
    pub month: Month,
    pub current_year: i32,
    pub prior_year: i32,
    pub fuel: CostComponent,
    pub current_year_cost: f64,
    pub prior_year_cost: f64,
    /// `prior - current`; positive when the current year was cheaper.
    pub absolute_savings: f64,
    /// `absolute / prior * 100`; 0 when both years are equal, undefined when
    /// nothing was billed last year but something was this year.
    pub percent_savings: Option<f64>,
    /// Cumulative `absolute_savings` for this series within `current_year`.
    pub running_total: f64,
    /// Savings after adjusting the prior year's cost to this year's
    /// degree-days; undefined without weather for both months.
    pub normalized_savings: Option<f64>,
    /// Degree-days of the series' basis in each year's month, when known.
    pub current_degree_days: Option<f64>,
    pub prior_degree_days: Option<f64>,
}
