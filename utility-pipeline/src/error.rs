use std::path::PathBuf;

use utility_model::TableError;

use crate::{charts::ChartError, config::ConfigError, pipeline::PipelineError};

/// Why a stage stopped.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    /// An upstream file is absent; `producer` names what writes it.
    #[error("missing input {}: expected from {producer}", .path.display())]
    MissingInput { path: PathBuf, producer: &'static str },
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("external service failure: {0}")]
    External(String),
    #[error("failed to write output: {0}")]
    Output(String),
    #[error("nothing to do: {0}")]
    Empty(String),
    #[error(transparent)]
    Table(TableError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("i/o error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
}

impl From<TableError> for StageError {
    fn from(e: TableError) -> Self {
        match e {
            TableError::Malformed { .. } => StageError::MalformedInput(e.to_string()),
            other => StageError::Table(other),
        }
    }
}

impl From<PipelineError> for StageError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Source(msg) | PipelineError::Transform(msg) => {
                StageError::MalformedInput(msg)
            }
            PipelineError::Sink(msg) => StageError::Output(msg),
        }
    }
}
