pub mod pipeline;
pub mod config;
pub mod error;
pub mod cli;
pub mod sources;
pub mod sinks;
pub mod transform;
pub mod observability;
pub mod weather;
pub mod extraction;
pub mod analysis;
pub mod charts;
pub mod stages;

pub use pipeline::{Pipeline, Envelope};
