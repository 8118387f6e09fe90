//! One module per command. Each stage reads its upstream files in full,
//! computes, and overwrites its own outputs.

use std::path::Path;

use crate::error::StageError;

pub mod charts;
pub mod efficiency;
pub mod efficiency_summary;
pub mod extract;
pub mod fetch_weather;
pub mod normalize;
pub mod savings;

/// Fail fast when an upstream file is absent, naming what produces it.
pub fn require_input(path: &Path, producer: &'static str) -> Result<(), StageError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StageError::MissingInput { path: path.to_path_buf(), producer })
    }
}
