//! Configuration file support for wslpaste.
//!
//! Settings are read from `~/.config/wslpaste/config.toml` (or the platform
//! equivalent) once at startup and handed to the capture pipeline as an
//! immutable value. If no config file exists, defaults are used.

pub mod types;

pub use types::{CaptureConfig, PathsConfig, StorageConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::hotkey::Key;

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// hotkey = "Win+Shift+S"
///
/// [capture]
/// timeout_secs = 15
/// poll_interval_ms = 100
/// cancel_key = "Escape"
///
/// [storage]
/// retention_hours = 24
///
/// [paths]
/// mount_root = "/mnt"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Key combination fired in hotkey-trigger mode
    #[serde(default = "types::default_hotkey")]
    pub hotkey: String,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub paths: PathsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hotkey: types::default_hotkey(),
            capture: CaptureConfig::default(),
            storage: StorageConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Config {
    /// Clamps numeric settings to their valid ranges and replaces empty or
    /// unparsable strings with defaults, logging a warning for each change.
    fn validate_and_clamp(&mut self) {
        if !(1..=300).contains(&self.capture.timeout_secs) {
            log::warn!(
                "Invalid timeout_secs {}, clamping to 1-300 range",
                self.capture.timeout_secs
            );
            self.capture.timeout_secs = self.capture.timeout_secs.clamp(1, 300);
        }

        if !(20..=1000).contains(&self.capture.poll_interval_ms) {
            log::warn!(
                "Invalid poll_interval_ms {}, clamping to 20-1000 range",
                self.capture.poll_interval_ms
            );
            self.capture.poll_interval_ms = self.capture.poll_interval_ms.clamp(20, 1000);
        }

        if !(1..=20).contains(&self.capture.read_attempts) {
            log::warn!(
                "Invalid read_attempts {}, clamping to 1-20 range",
                self.capture.read_attempts
            );
            self.capture.read_attempts = self.capture.read_attempts.clamp(1, 20);
        }

        if Key::parse(&self.capture.cancel_key).is_err() {
            log::warn!(
                "Invalid cancel_key '{}', falling back to 'Escape'",
                self.capture.cancel_key
            );
            self.capture.cancel_key = "Escape".to_string();
        }

        if !(1..=8760).contains(&self.storage.retention_hours) {
            log::warn!(
                "Invalid retention_hours {}, clamping to 1-8760 range",
                self.storage.retention_hours
            );
            self.storage.retention_hours = self.storage.retention_hours.clamp(1, 8760);
        }

        if self.storage.directory_name.trim().is_empty()
            || self.storage.directory_name.contains(['/', '\\'])
        {
            log::warn!(
                "Invalid storage directory_name '{}', falling back to default",
                self.storage.directory_name
            );
            self.storage.directory_name = types::default_directory_name();
        }

        if self.storage.file_prefix.trim().is_empty()
            || self.storage.file_prefix.contains(['/', '\\'])
        {
            log::warn!(
                "Invalid storage file_prefix '{}', falling back to default",
                self.storage.file_prefix
            );
            self.storage.file_prefix = types::default_file_prefix();
        }

        if !self.paths.mount_root.starts_with('/') {
            log::warn!(
                "Invalid mount_root '{}', falling back to '/mnt'",
                self.paths.mount_root
            );
            self.paths.mount_root = types::default_mount_root();
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("wslpaste");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Loads configuration from `config_path`, or returns defaults if the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or contains invalid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Scratch directory under the platform temp root.
    pub fn scratch_dir(&self) -> PathBuf {
        std::env::temp_dir().join(&self.storage.directory_name)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.capture.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.capture.poll_interval_ms)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.storage.retention_hours * 3600)
    }
}
