//! JSON config file loading, lazy creation, and saving.

use std::path::{Path, PathBuf};

use ciska_common::ConfigError;
use tracing::{debug, info};

use crate::schema::AppConfig;
use crate::validation;

const APP_NAME: &str = "ciska";
const CONFIG_FILE_NAME: &str = "config.json";

/// Contents written when no config file exists yet.
const EMPTY_CONFIG: &str = "{}";

/// Handle to one environment's `config.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store whose file lives directly inside `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(CONFIG_FILE_NAME),
        }
    }

    /// Store at the platform default location for `environment`.
    ///
    /// On Linux: `~/.config/ciska/<environment>/config.json`
    /// On macOS: `~/Library/Application Support/ciska/<environment>/config.json`
    pub fn for_environment(environment: &str) -> Result<Self, ConfigError> {
        validation::validate_environment(environment)?;
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::ParseError("could not determine config directory".into())
        })?;
        Ok(Self::new(config_dir.join(APP_NAME).join(environment)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with an empty object if it does not exist yet.
    ///
    /// Returns `true` when the file was created by this call.
    pub fn ensure_exists(&self) -> Result<bool, ConfigError> {
        if self.path.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::ParseError(format!(
                    "failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        std::fs::write(&self.path, EMPTY_CONFIG).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to write default config to {}: {e}",
                self.path.display()
            ))
        })?;

        info!("created default config at {}", self.path.display());
        Ok(true)
    }

    /// Read the file as raw JSON, creating it first if needed.
    pub fn load_or_create_value(&self) -> Result<serde_json::Value, ConfigError> {
        self.ensure_exists()?;
        self.read_value()
    }

    /// Read and validate the config, creating the file first if needed.
    pub fn load_or_create(&self) -> Result<AppConfig, ConfigError> {
        let value = self.load_or_create_value()?;
        Self::parse(value)
    }

    /// Read and validate an existing config file.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::FileNotFound(self.path.clone()));
        }
        let value = self.read_value()?;
        Self::parse(value)
    }

    /// Write `config` back to disk as pretty-printed JSON.
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        validation::validate(config)?;
        let content = serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::ParseError(format!("failed to serialize config: {e}")))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::ParseError(format!(
                    "failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        std::fs::write(&self.path, content).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to write config to {}: {e}",
                self.path.display()
            ))
        })?;
        info!("saved config to {}", self.path.display());
        Ok(())
    }

    fn read_value(&self) -> Result<serde_json::Value, ConfigError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ConfigError::ParseError(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let value = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("failed to parse JSON: {e}")))?;
        debug!("loaded config from {}", self.path.display());
        Ok(value)
    }

    fn parse(value: serde_json::Value) -> Result<AppConfig, ConfigError> {
        let config: AppConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::ParseError(format!("invalid config: {e}")))?;
        validation::validate(&config)?;
        Ok(config)
    }
}
