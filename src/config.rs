//! Configuration management for the application.
//!
//! This module handles loading and validating user defaults
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{APP_BINARY_NAME, DEFAULT_MAP_SET};
use crate::models::Settings;

/// Defaults applied when a command line leaves them out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Key map set to resolve against (e.g., "ISO", "ANSI")
    #[serde(default)]
    pub map_set: Option<String>,
    /// Settings JSON used when `--settings` is not given
    #[serde(default)]
    pub settings: Option<PathBuf>,
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/keylegend/config.toml`
/// - macOS: `~/Library/Application Support/keylegend/config.toml`
/// - Windows: `%APPDATA%\keylegend\config.toml`
///
/// # Example
///
/// ```toml
/// [defaults]
/// map_set = "ISO"
/// settings = "/home/me/layouts/legends.json"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    /// Command defaults
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_BINARY_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the user config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from an explicit path, defaulting when it is missing.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Validates configuration values.
    ///
    /// The default map set, when present, must not be blank.
    pub fn validate(&self) -> Result<()> {
        if let Some(map_set) = &self.defaults.map_set {
            if map_set.trim().is_empty() {
                anyhow::bail!("defaults.map_set must not be empty");
            }
        }
        Ok(())
    }

    /// Picks the key map set: CLI flag, then settings, then config, then "ISO".
    #[must_use]
    pub fn effective_map_set(&self, cli: Option<&str>, settings: &Settings) -> String {
        cli.or(settings.map_set.as_deref())
            .or(self.defaults.map_set.as_deref())
            .unwrap_or(DEFAULT_MAP_SET)
            .to_string()
    }

    /// Picks the settings file: CLI flag first, then the configured default.
    #[must_use]
    pub fn effective_settings_path<'a>(&'a self, cli: Option<&'a Path>) -> Option<&'a Path> {
        cli.or(self.defaults.settings.as_deref())
    }
}
