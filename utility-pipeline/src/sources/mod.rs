pub mod billing_csv;

pub use billing_csv::BillingCsvSource;
