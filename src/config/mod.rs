//! Configuration management for CarrierClip
//!
//! This module handles loading, validating, and saving the TOML
//! configuration used by the command line front end.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::clipboard::{CARRIER_NAME, MAX_CLIPBOARD_SIZE};

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "CARRIERCLIP_CONFIG";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Failed to write TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// Validation error
    #[error("Config validation failed: {0}")]
    Validation(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shared library configuration
    #[serde(default)]
    pub library: LibraryConfig,

    /// Clipboard configuration
    #[serde(default)]
    pub clipboard: ClipboardConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Shared picture library configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Path to the SQLite database holding saved pictures
    #[serde(default = "default_library_path")]
    pub path: PathBuf,

    /// Name of the picture the clipboard is hidden in
    #[serde(default = "default_carrier_name")]
    pub carrier_name: String,
}

/// Clipboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Maximum payload size in bytes
    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

fn default_library_path() -> PathBuf {
    PathBuf::from("~/.local/share/carrierclip/library.db")
}

fn default_carrier_name() -> String {
    CARRIER_NAME.to_string()
}

fn default_max_size() -> usize {
    MAX_CLIPBOARD_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: default_library_path(),
            carrier_name: default_carrier_name(),
        }
    }
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: LibraryConfig::default(),
            clipboard: ClipboardConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Checks in order:
    /// 1. Path from CARRIERCLIP_CONFIG environment variable
    /// 2. ~/.config/carrierclip/config.toml
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = Self::find_config_path() {
            Self::load_from_path(&path)
        } else {
            let mut config = Self::default();
            config.expand_paths();
            Ok(config)
        }
    }

    /// Load configuration with optional custom path
    pub fn load_config(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml_str)?;
        config.expand_paths();
        config.validate_config()?;
        Ok(config)
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("carrierclip").join("config.toml"))
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        Self::default_path().filter(|p| p.exists())
    }

    fn expand_paths(&mut self) {
        self.library.path = expand_path(&self.library.path);
    }

    fn validate_config(&self) -> Result<(), ConfigError> {
        if self.library.carrier_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "carrier_name must not be empty".to_string(),
            ));
        }

        // Validate max_size range (1KB to 50MB)
        if self.clipboard.max_size < 1024 {
            return Err(ConfigError::Validation(
                "max_size must be at least 1024 bytes (1KB)".to_string(),
            ));
        }
        if self.clipboard.max_size > 52_428_800 {
            return Err(ConfigError::Validation(
                "max_size must not exceed 52428800 bytes (50MB)".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not find config directory",
            ))
        })?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Write the commented example configuration to `path`
    pub fn write_example(path: &Path, force: bool) -> Result<(), ConfigError> {
        if !force && path.exists() {
            return Err(ConfigError::Validation(
                "Config file already exists. Use --force to overwrite.".to_string(),
            ));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::generate_example())?;
        Ok(())
    }

    /// Generate example configuration file
    pub fn generate_example() -> String {
        let config = Config::default();

        format!(
            r#"# CarrierClip Configuration File
# Location: ~/.config/carrierclip/config.toml

# Logging level (trace, debug, info, warn, error)
log_level = "{}"

# Shared picture library
[library]
# SQLite database standing in for the shared photo library
path = "{}"
# Name of the picture the clipboard is hidden in
carrier_name = "{}"

# Clipboard settings
[clipboard]
# Maximum clipboard payload size in bytes (5MB default)
max_size = {}
"#,
            config.log_level,
            config.library.path.display(),
            config.library.carrier_name,
            config.clipboard.max_size,
        )
    }
}

/// Expand tilde in path
fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(path_str.as_ref());
    PathBuf::from(expanded.into_owned())
}
