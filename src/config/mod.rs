//! User preferences persisted next to the ledger data.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::paths;

const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),
}

/// Stores user-configurable front-end preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "Config::default_locale")]
    pub locale: String,
    /// Seconds between status re-checks in `watch` mode.
    #[serde(default = "Config::default_status_refresh_secs")]
    pub status_refresh_secs: u64,
    #[serde(default = "Config::default_confirm_finalize")]
    pub confirm_finalize: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional directory for the ledger data file. Defaults to the application directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: Self::default_currency_symbol(),
            locale: Self::default_locale(),
            status_refresh_secs: Self::default_status_refresh_secs(),
            confirm_finalize: Self::default_confirm_finalize(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn default_currency_symbol() -> String {
        "$".into()
    }

    pub fn default_locale() -> String {
        "en-US".into()
    }

    pub fn default_status_refresh_secs() -> u64 {
        60
    }

    pub fn default_confirm_finalize() -> bool {
        true
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(paths::app_data_dir)
    }
}

/// Loads and saves [`Config`] as JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Manager for `<base>/config/config.json`.
    pub fn with_base_dir(base: &Path) -> Result<Self, ConfigError> {
        let config_dir = base.join(CONFIG_DIR);
        fs::create_dir_all(&config_dir)?;
        Ok(Self::new(config_dir.join(CONFIG_FILE)))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the config file, falling back to defaults when it does not exist.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.config_path)?;
        serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.config_path);
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.status_refresh_secs, 60);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("config.json"));
        fs::write(manager.config_path(), r#"{"currency_symbol":"€"}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.currency_symbol, "€");
        assert!(config.confirm_finalize);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("config.json"));
        fs::write(manager.config_path(), "{oops").unwrap();
        assert!(matches!(manager.load(), Err(ConfigError::Serde(_))));
    }
}
