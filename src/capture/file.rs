//! Scratch storage for captured images.

use super::types::CaptureError;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Timestamp appended to the file prefix, one-second granularity.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Saves images into a single scratch directory and sweeps out old ones.
#[derive(Debug, Clone)]
pub struct TempFileStore {
    directory: PathBuf,
    prefix: String,
}

impl TempFileStore {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write PNG bytes to a new timestamped file and return its path.
    ///
    /// Two saves within the same second share a name; the later one wins.
    pub fn save(&self, png: &[u8]) -> Result<PathBuf, CaptureError> {
        let directory = ensure_directory_exists(&self.directory)?;
        let file_path = directory.join(generate_filename(&self.prefix));

        log::info!(
            "Saving screenshot to: {} ({} bytes)",
            file_path.display(),
            png.len()
        );

        fs::write(&file_path, png)?;

        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&file_path, Permissions::from_mode(0o600))?;
        }

        Ok(file_path)
    }

    /// Delete stored images last modified more than `max_age` ago.
    ///
    /// Only regular files named `<prefix>*.png` are considered.
    ///
    /// Best effort: every I/O error is logged and skipped. Returns the number
    /// of files removed.
    pub fn sweep(&self, max_age: Duration) -> usize {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!(
                    "Skipping sweep of {}: {}",
                    self.directory.display(),
                    e
                );
                return 0;
            }
        };

        let now = SystemTime::now();
        let mut removed = 0;
        for entry in entries.flatten() {
            if !self.owns(&entry.file_name().to_string_lossy()) {
                continue;
            }
            let path = entry.path();
            let modified = match entry.metadata().and_then(|m| {
                if m.is_file() {
                    m.modified().map(Some)
                } else {
                    Ok(None)
                }
            }) {
                Ok(Some(modified)) => modified,
                Ok(None) => continue,
                Err(e) => {
                    log::debug!("Cannot stat {}: {}", path.display(), e);
                    continue;
                }
            };

            // Files stamped in the future have age zero.
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= max_age {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    log::debug!("Removed expired screenshot {}", path.display());
                    removed += 1;
                }
                Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        if removed > 0 {
            log::info!(
                "Swept {} expired file(s) from {}",
                removed,
                self.directory.display()
            );
        }
        removed
    }

    fn owns(&self, file_name: &str) -> bool {
        file_name.starts_with(&self.prefix) && file_name.ends_with(".png")
    }
}

/// Generate `<prefix><timestamp>.png` for the current local time.
pub fn generate_filename(prefix: &str) -> String {
    format!("{}{}.png", prefix, Local::now().format(TIMESTAMP_FORMAT))
}

/// Ensure the directory exists, creating it if necessary.
pub fn ensure_directory_exists(directory: &Path) -> Result<PathBuf, CaptureError> {
    if !directory.exists() {
        log::info!("Creating scratch directory: {}", directory.display());
        fs::create_dir_all(directory)?;
    }
    Ok(directory.to_path_buf())
}
