use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use utility_model::tables;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON config {}: {source}", .path.display())]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("invalid TOML config {}: {source}", .path.display())]
    Toml { path: PathBuf, source: toml::de::Error },
    #[error("config {} must set `{field}`", .path.display())]
    Missing { path: PathBuf, field: &'static str },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Raw billing CSVs.
    pub data_dir: PathBuf,
    /// Tables written by normalize / fetch-weather / compute-efficiency.
    pub processed_dir: PathBuf,
    /// Charts and reports.
    pub output_dir: PathBuf,
    /// PDF bills for extraction.
    pub bills_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            processed_dir: PathBuf::from("data").join("processed"),
            output_dir: PathBuf::from("output"),
            bills_dir: PathBuf::from("data").join("electric_bills"),
        }
    }
}

impl PathsConfig {
    pub fn electric_raw(&self) -> PathBuf {
        self.data_dir.join("electric_raw.csv")
    }

    pub fn oil_raw(&self) -> PathBuf {
        self.data_dir.join("oil_raw.csv")
    }

    pub fn processed(&self, table: &str) -> PathBuf {
        self.processed_dir.join(table)
    }

    pub fn output(&self, file: &str) -> PathBuf {
        self.output_dir.join(file)
    }

    pub fn utility_costs(&self) -> PathBuf {
        self.processed(tables::UTILITY_COSTS)
    }

    pub fn weather_data(&self) -> PathBuf {
        self.processed(tables::WEATHER_DATA)
    }

    pub fn efficiency_metrics(&self) -> PathBuf {
        self.processed(tables::EFFICIENCY_METRICS)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://archive-api.open-meteo.com".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EfficiencyConfig {
    /// Months at or below this many degree-days are excluded.
    pub min_degree_days: f64,
    /// Cost per HDD above which a month is flagged in the log.
    pub high_cost_warning: f64,
    pub summary_window_months: usize,
}

impl Default for EfficiencyConfig {
    fn default() -> Self {
        Self {
            min_degree_days: 5.0,
            high_cost_warning: 10.0,
            summary_window_months: 24,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

fn default_base_temp_c() -> f64 {
    18.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default = "default_base_temp_c")]
    pub base_temp_c: f64,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub efficiency: EfficiencyConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            base_temp_c: default_base_temp_c(),
            paths: PathsConfig::default(),
            weather: WeatherConfig::default(),
            efficiency: EfficiencyConfig::default(),
            extraction: ExtractionConfig::default(),
            source: None,
        }
    }
}

impl AppConfig {
    /// Load `path` as TOML when it ends in `.toml`, JSON otherwise. A missing
    /// file yields the defaults, which is enough for every stage except the
    /// weather fetch.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read { path: path.to_path_buf(), source });
            }
        };

        let mut cfg: AppConfig = if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&contents)
                .map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source })?
        } else {
            serde_json::from_str(&contents)
                .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })?
        };
        cfg.source = Some(path.to_path_buf());
        Ok(cfg)
    }

    /// `(latitude, longitude)`, required by the weather fetch.
    pub fn location(&self) -> Result<(f64, f64), ConfigError> {
        let path = self
            .source
            .clone()
            .unwrap_or_else(|| PathBuf::from("config.json"));
        let latitude = self
            .latitude
            .ok_or(ConfigError::Missing { path: path.clone(), field: "latitude" })?;
        let longitude = self
            .longitude
            .ok_or(ConfigError::Missing { path, field: "longitude" })?;
        Ok((latitude, longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_config_with_only_location_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"latitude": 42.36, "longitude": -71.06}"#).unwrap();

        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.location().unwrap(), (42.36, -71.06));
        assert_eq!(cfg.base_temp_c, 18.0);
        assert_eq!(cfg.paths.processed_dir, PathBuf::from("data/processed"));
        assert_eq!(cfg.efficiency.min_degree_days, 5.0);
    }

    #[test]
    fn toml_config_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("utility.toml");
        fs::write(
            &path,
            r#"
latitude = 51.5
longitude = -0.12
base_temp_c = 15.5

[paths]
output_dir = "reports"
"#,
        )
        .unwrap();

        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.base_temp_c, 15.5);
        assert_eq!(cfg.paths.output_dir, PathBuf::from("reports"));
        assert_eq!(cfg.paths.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn missing_file_uses_defaults_but_has_no_location() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load(&dir.path().join("config.json")).unwrap();
        let err = cfg.location().unwrap_err();
        assert!(err.to_string().contains("latitude"), "{err}");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ latitude: ").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Json { .. })));
    }
}
