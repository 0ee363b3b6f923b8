use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::stats::ArrivalPolicy;

const CONFIG_PATH: &str = "config.toml";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub data: DataConfig,
    pub export: ExportConfig,
    pub ui: UiConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub source: String, // File path or http(s) URL of the flights CSV
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub directory: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UiConfig {
    pub default_view: String,  // "Overview", "Analytics", "Records" or "Map"
    pub default_chart: String, // "daily" or "monthly"
    pub tick_rate_ms: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub arrival_policy: ArrivalPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                source: "data/processed_flights.csv".to_string(),
            },
            export: ExportConfig {
                directory: "exports".to_string(),
            },
            ui: UiConfig {
                default_view: "Overview".to_string(),
                default_chart: "daily".to_string(),
                tick_rate_ms: 50,
            },
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl Config {
    /// Loads config.toml from the working directory.
    /// If it doesn't exist, creates a default one.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    pub fn load_from(config_path: &Path) -> Self {
        if let Ok(content) = fs::read_to_string(config_path) {
            match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => {
                    warn!("Failed to parse {}: {}. Using defaults.", config_path.display(), e);
                    return Config::default();
                }
            }
        }

        let default_config = Config::default();

        // Save default config to disk for the user to edit later
        match toml::to_string_pretty(&default_config) {
            Ok(toml_string) => {
                if fs::write(config_path, toml_string).is_err() {
                    warn!("Could not write default {} to disk.", config_path.display());
                }
            }
            Err(e) => warn!("Could not serialize default config: {}", e),
        }

        info!("Loaded default configuration.");
        default_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path);
        assert_eq!(config, Config::default());
        assert!(path.exists());

        // The written file loads back to the same values.
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_partial_analytics_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[data]
source = "https://example.com/flights.csv"

[export]
directory = "/tmp/out"

[ui]
default_view = "Analytics"
default_chart = "monthly"
tick_rate_ms = 100

[analytics]
arrival_policy = "count_all"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.data.source, "https://example.com/flights.csv");
        assert_eq!(config.ui.default_chart, "monthly");
        assert_eq!(config.analytics.arrival_policy, ArrivalPolicy::CountAll);
    }

    #[test]
    fn test_missing_analytics_section_uses_default_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[data]
source = "flights.csv"

[export]
directory = "."

[ui]
default_view = "Overview"
default_chart = "daily"
tick_rate_ms = 75
"#,
        )
        .unwrap();

        let loaded = Config::load_from(&path);
        assert_eq!(loaded.ui.tick_rate_ms, 75);
        assert_eq!(loaded.analytics.arrival_policy, ArrivalPolicy::SkipSameCountry);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is = = not toml").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }
}
