use std::path::PathBuf;

use clap::Parser;

use crate::config::{AppConfig, ConfigError};

/// Flags shared by every stage binary. None are required.
#[derive(Debug, Parser)]
pub struct StageArgs {
    /// JSON (or `.toml`) configuration file.
    #[arg(long, env = "UTILITY_CONFIG", default_value = "config.json")]
    pub config: PathBuf,
}

impl StageArgs {
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        AppConfig::load(&self.config)
    }
}
