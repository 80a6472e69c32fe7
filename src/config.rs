//! Configuration module for transcoder-iac
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/transcoder-iac/config.toml)
//! - User configuration (~/.transcoder-iac/config.toml)
//! - Project configuration (./transcoder-iac.toml)
//! - Environment variables
//! - Command-line arguments

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use transcoder_iac::telemetry::{LogFormat, LoggingConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Default settings
    pub defaults: Defaults,

    /// Colors and output settings
    pub colors: ColorsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Default settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Defaults {
    /// AWS region for tasks that do not set one
    pub region: Option<String>,

    /// Always show diffs
    pub diff: bool,
}

/// Colors configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorsConfig {
    /// Enable colors
    pub enabled: bool,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Load configuration from standard locations, then the environment.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                config = config.merge_from_file(&path)?;
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Get the list of configuration file paths to check, lowest priority first
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        if let Some(path) = explicit_path {
            return vec![path.clone()];
        }

        let mut paths = vec![PathBuf::from("/etc/transcoder-iac/config.toml")];

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".transcoder-iac/config.toml"));
        }

        paths.push(PathBuf::from("transcoder-iac.toml"));

        if let Ok(env_config) = std::env::var("TRANSCODER_IAC_CONFIG") {
            paths.push(PathBuf::from(env_config));
        }

        paths
    }

    /// Merge configuration from a file
    fn merge_from_file(&self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let file_config: Config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(self.merge(file_config))
    }

    /// Merge another config into this one; `other` wins where it differs from the defaults
    fn merge(&self, other: Config) -> Config {
        Config {
            defaults: Defaults {
                region: other
                    .defaults
                    .region
                    .or_else(|| self.defaults.region.clone()),
                diff: other.defaults.diff || self.defaults.diff,
            },
            colors: ColorsConfig {
                enabled: other.colors.enabled && self.colors.enabled,
            },
            logging: if other.logging != LoggingConfig::default() {
                other.logging
            } else {
                self.logging.clone()
            },
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(region) = std::env::var("TRANSCODER_IAC_REGION") {
            if !region.is_empty() {
                self.defaults.region = Some(region);
            }
        }

        if let Ok(format) = std::env::var("TRANSCODER_IAC_LOG_FORMAT") {
            match format.parse::<LogFormat>() {
                Ok(format) => self.logging.format = format,
                Err(e) => tracing::warn!("Ignoring TRANSCODER_IAC_LOG_FORMAT: {}", e),
            }
        }

        if std::env::var_os("NO_COLOR").is_some() {
            self.colors.enabled = false;
        }
    }
}
