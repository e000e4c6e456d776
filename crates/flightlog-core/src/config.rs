use crate::geodesic::{DistanceModel, DistanceUnit};
use crate::stats::{StatsOptions, DEFAULT_HOME_COUNTRY, DEFAULT_TOP_ENDPOINTS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenFlights-style airport table.
    pub airports_path: PathBuf,
    /// Local copy of the calendar events.
    pub events_cache_path: PathBuf,
    pub home_country: String,
    pub top_endpoints: usize,
    pub distance_model: DistanceModel,
    pub distance_unit: DistanceUnit,
    /// Read events from the cache when it exists instead of the provider.
    pub use_cached_events: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            airports_path: PathBuf::from("data/airports.txt"),
            events_cache_path: PathBuf::from("data/events.json"),
            home_country: DEFAULT_HOME_COUNTRY.to_string(),
            top_endpoints: DEFAULT_TOP_ENDPOINTS,
            distance_model: DistanceModel::default(),
            distance_unit: DistanceUnit::default(),
            use_cached_events: true,
        }
    }
}

impl Config {
    pub fn stats_options(&self) -> StatsOptions {
        StatsOptions {
            home_country: self.home_country.clone(),
            top_endpoints: self.top_endpoints,
            distance_model: self.distance_model,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new<P: AsRef<Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// `config.json` under the per-user config directory.
    pub fn default_path() -> PathBuf {
        crate::get_config_root().join("config.json")
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            log::debug!(
                "No config at {}, using defaults",
                self.config_path.display()
            );
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read {}", self.config_path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.config_path.display()))
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, content)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))
    }
}
