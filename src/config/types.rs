//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Settings for the wait/read phase of a capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// How long to wait for new clipboard content in hotkey-trigger mode, in seconds
    /// (valid range: 1 - 300)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Clipboard poll interval in milliseconds (valid range: 20 - 1000)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Key that aborts the wait while held (same syntax as a hotkey terminal key)
    #[serde(default = "default_cancel_key")]
    pub cancel_key: String,

    /// Number of attempts made to read a busy clipboard (valid range: 1 - 20)
    #[serde(default = "default_read_attempts")]
    pub read_attempts: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            cancel_key: default_cancel_key(),
            read_attempts: default_read_attempts(),
        }
    }
}

/// Settings for the scratch directory holding saved screenshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory name created under the platform temp root
    #[serde(default = "default_directory_name")]
    pub directory_name: String,

    /// Prefix of generated file names
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Files older than this are removed at the start of each run (valid range: 1 - 8760)
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory_name: default_directory_name(),
            file_prefix: default_file_prefix(),
            retention_hours: default_retention_hours(),
        }
    }
}

/// Settings for host to guest path translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Where the guest mounts host drives (`/mnt` gives `/mnt/c/...`)
    #[serde(default = "default_mount_root")]
    pub mount_root: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            mount_root: default_mount_root(),
        }
    }
}

pub(crate) fn default_hotkey() -> String {
    "Win+Shift+S".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_cancel_key() -> String {
    "Escape".to_string()
}

fn default_read_attempts() -> u32 {
    5
}

pub(crate) fn default_directory_name() -> String {
    "wsl-paste-image".to_string()
}

pub(crate) fn default_file_prefix() -> String {
    "wsl_shot_".to_string()
}

fn default_retention_hours() -> u64 {
    24
}

pub(crate) fn default_mount_root() -> String {
    "/mnt".to_string()
}
