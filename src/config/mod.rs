use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Result, TrackerError};
use crate::taxonomy::{Taxonomy, TransactionKind};
use crate::utils::{app_data_dir, persistence};

const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";

/// User preferences for the shell and the category field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_locale")]
    pub locale: String,
    #[serde(default)]
    pub default_kind: TransactionKind,
    /// Taxonomy file replacing the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy_path: Option<PathBuf>,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stats_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Self::default_locale(),
            default_kind: TransactionKind::default(),
            taxonomy_path: None,
            ui_color_enabled: Self::default_ui_color_enabled(),
            last_stats_file: None,
        }
    }
}

impl Config {
    pub fn default_locale() -> String {
        "vi-VN".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    /// The configured taxonomy, or the built-in one when none is set.
    pub fn resolve_taxonomy(&self) -> Result<Arc<Taxonomy>> {
        match &self.taxonomy_path {
            Some(path) => Taxonomy::load(path)
                .map(Arc::new)
                .map_err(|err| {
                    TrackerError::Config(format!(
                        "taxonomy `{}` could not be loaded: {}",
                        path.display(),
                        err
                    ))
                }),
            None => Ok(Taxonomy::builtin()),
        }
    }
}

/// Loads and saves [`Config`] as JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Manager rooted at the application data directory.
    pub fn from_app_dir() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        let config_dir = base.join(CONFIG_DIR);
        fs::create_dir_all(&config_dir)?;
        Ok(Self::new(config_dir.join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        persistence::read_json(&self.path)
            .map_err(|err| TrackerError::Config(format!("{}: {}", self.path.display(), err)))
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        persistence::write_json_atomic(config, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"default_kind": "income"}"#).unwrap();
        let config = ConfigManager::new(path).load().unwrap();
        assert_eq!(config.default_kind, TransactionKind::Income);
        assert_eq!(config.locale, "vi-VN");
        assert!(config.ui_color_enabled);
    }

    #[test]
    fn unreadable_taxonomy_is_a_config_error() {
        let config = Config {
            taxonomy_path: Some(PathBuf::from("/definitely/not/here.json")),
            ..Config::default()
        };
        assert!(matches!(config.resolve_taxonomy(), Err(TrackerError::Config(_))));
    }
}
