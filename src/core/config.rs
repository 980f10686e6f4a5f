use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::SniperError;

/// Operational configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub logs: LogConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub settings_path: PathBuf,
    pub snipes_path: PathBuf,
    pub auctions_path: PathBuf,
    pub sales_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub health_port: u16,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let log_dir = PathBuf::from(env::var("SNIPER_LOG_DIR").unwrap_or_else(|_| ".".to_string()));

        Ok(Config {
            api: ApiConfig {
                base_url: env::var("HYPIXEL_API_BASE")
                    .unwrap_or_else(|_| "https://api.hypixel.net".to_string()),
            },
            logs: LogConfig {
                settings_path: env::var("SNIPER_CONFIG_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| log_dir.join("config.json")),
                snipes_path: log_dir.join("snipes_log.txt"),
                auctions_path: log_dir.join("auctions_log.txt"),
                sales_path: log_dir.join("sales_log.txt"),
            },
            monitoring: MonitoringConfig {
                health_port: env::var("HEALTH_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
        })
    }
}

/// User-editable scanner settings, persisted as JSON. Re-read at the start
/// of every scan cycle; a corrupt or missing file is reset to defaults and
/// the reset is written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerSettings {
    #[serde(default = "default_budget")]
    pub budget: u64,
    #[serde(default = "default_min_profit_percent")]
    pub min_profit_percent: f64,
}

fn default_budget() -> u64 {
    1_000_000
}

fn default_min_profit_percent() -> f64 {
    20.0
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            min_profit_percent: default_min_profit_percent(),
        }
    }
}

impl ScannerSettings {
    /// Load settings, recovering from every failure mode by resetting to
    /// defaults and persisting the reset. Never fails the caller.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("{} - resetting to defaults", e);
                let settings = Self::default();
                if let Err(e) = settings.save(path) {
                    tracing::warn!("Failed to persist reset settings: {}", e);
                }
                settings
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, SniperError> {
        if !path.exists() {
            return Err(SniperError::Config(format!(
                "settings file {} does not exist",
                path.display()
            )));
        }
        let raw = fs::read_to_string(path)
            .map_err(|e| SniperError::Config(format!("unreadable settings file: {}", e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| SniperError::Config(format!("invalid settings file: {}", e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn min_profit_fraction(&self) -> f64 {
        self.min_profit_percent / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_resets_to_defaults_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let settings = ScannerSettings::load(&path);
        assert_eq!(settings.budget, 1_000_000);
        assert_eq!(settings.min_profit_percent, 20.0);
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_resets_to_defaults_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json at all").unwrap();

        let settings = ScannerSettings::load(&path);
        assert_eq!(settings.budget, 1_000_000);

        // The reset must have been written back out.
        let reloaded: ScannerSettings =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.budget, settings.budget);
    }

    #[test]
    fn valid_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let settings = ScannerSettings {
            budget: 5_600_000,
            min_profit_percent: 35.0,
        };
        settings.save(&path).unwrap();

        let loaded = ScannerSettings::load(&path);
        assert_eq!(loaded.budget, 5_600_000);
        assert!((loaded.min_profit_fraction() - 0.35).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"budget": 2500000}"#).unwrap();

        let settings = ScannerSettings::load(&path);
        assert_eq!(settings.budget, 2_500_000);
        assert_eq!(settings.min_profit_percent, 20.0);
    }
}
