pub mod billing;
pub mod efficiency;
pub mod month;
pub mod savings;
pub mod weather;

pub use billing::{BillingRecord, CostComponent, Fuel, MonthlyCostRecord, MonthlyUsage, RateRecord};
pub use efficiency::{
    DegreeDayBasis, EfficiencyExclusion, EfficiencyRecord, EfficiencySummary, ExclusionReason,
};
pub use savings::SavingsRecord;
pub use weather::{DailyObservation, WeatherRecord};
