use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    compare::ComparisonList,
    history::{Favorites, RecentSearches},
    model::Units,
};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// default_city = "London"
/// recent = ["London", "Paris"]
/// favorites = ["Tokyo"]
/// compare = ["Paris", "Rome"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,

    #[serde(default)]
    pub units: Units,

    pub default_city: Option<String>,

    #[serde(default)]
    pub recent: RecentSearches,

    #[serde(default)]
    pub favorites: Favorites,

    #[serde(default)]
    pub compare: ComparisonList,

    /// Key from the environment; never written back to disk.
    #[serde(skip)]
    env_api_key: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist
    /// yet. A non-empty `OPENWEATHER_API_KEY` takes precedence over the
    /// stored key.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_from(&Self::config_file_path()?)?;

        if let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()) {
            cfg.env_api_key = Some(key);
        }

        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Returns the API key, preferring the environment over the file.
    pub fn api_key(&self) -> Option<&str> {
        self.env_api_key
            .as_deref()
            .or(self.api_key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    /// City to use when none is given: the configured default, else the most
    /// recent search.
    pub fn fallback_city(&self) -> Result<&str> {
        self.default_city
            .as_deref()
            .or_else(|| self.recent.latest())
            .ok_or_else(|| {
                anyhow!(
                    "No city given and no default city configured.\n\
                     Hint: pass a city (e.g. `weather now London`) or run `weather configure`."
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("nope.toml")).expect("load");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.units, Units::Metric);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config {
            api_key: Some("OPEN_KEY".into()),
            units: Units::Imperial,
            default_city: Some("Denver".into()),
            ..Config::default()
        };
        cfg.recent.record("Boise");
        cfg.favorites.add("Reno");
        cfg.compare.add("Tahoe").expect("room");

        cfg.save_to(&path).expect("save");
        let loaded = Config::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn parses_minimal_file() {
        let cfg: Config = toml::from_str("units = \"imperial\"").expect("parse");
        assert_eq!(cfg.units, Units::Imperial);
        assert!(cfg.api_key().is_none());
        assert!(cfg.recent.is_empty());
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = Config {
            api_key: Some("   ".into()),
            ..Config::default()
        };
        assert!(cfg.api_key().is_none());
    }

    #[test]
    fn env_key_wins_but_is_not_saved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        let cfg = Config {
            api_key: Some("FILE_KEY".into()),
            env_api_key: Some("ENV_KEY".into()),
            ..Config::default()
        };
        assert_eq!(cfg.api_key(), Some("ENV_KEY"));

        cfg.save_to(&path).expect("save");
        let saved = fs::read_to_string(&path).expect("read");
        assert!(saved.contains("FILE_KEY"));
        assert!(!saved.contains("ENV_KEY"));
    }

    #[test]
    fn fallback_city_prefers_default_then_recent() {
        let mut cfg = Config::default();
        let err = cfg.fallback_city().unwrap_err();
        assert!(err.to_string().contains("No city given"));

        cfg.recent.record("Porto");
        assert_eq!(cfg.fallback_city().expect("recent"), "Porto");

        cfg.default_city = Some("Faro".into());
        assert_eq!(cfg.fallback_city().expect("default"), "Faro");
    }
}
