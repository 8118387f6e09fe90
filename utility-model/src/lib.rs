//! Domain records and processed-table IO for the utility bill pipeline.

pub mod domain;
pub mod tables;

pub use tables::TableError;
