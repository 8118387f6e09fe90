pub mod monthly;

pub use monthly::{aggregate_monthly, MonthlyAggregateSink};
