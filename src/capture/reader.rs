//! Contention-tolerant typed reads of the clipboard.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sha2::{Digest, Sha256};

use super::clipboard::ClipboardAccess;
use super::types::{ClipboardError, ClipboardFingerprint, ClipboardImage, ClipboardPayload};

const READ_RETRY_DELAY: Duration = Duration::from_millis(50);
const FINGERPRINT_ATTEMPTS: u32 = 3;

// The digest covers at most SAMPLE_BLOCKS blocks of SAMPLE_BLOCK_LEN bytes.
const SAMPLE_BLOCKS: usize = 1024;
const SAMPLE_BLOCK_LEN: usize = 64;

/// Reads the clipboard as a [`ClipboardPayload`], retrying while it is busy.
///
/// A file reference wins over image pixels: the file-drop list first, then
/// text naming an existing file, then the image itself.
#[derive(Clone)]
pub struct ClipboardReader {
    clipboard: Arc<dyn ClipboardAccess>,
    retry_delay: Duration,
}

impl ClipboardReader {
    pub fn new(clipboard: Arc<dyn ClipboardAccess>) -> Self {
        Self {
            clipboard,
            retry_delay: READ_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Make up to `max_attempts` attempts and return the first content found.
    pub fn read(&self, max_attempts: u32) -> ClipboardPayload {
        let max_attempts = max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.read_once() {
                Ok(ClipboardPayload::None) => {
                    log::trace!("Clipboard empty (attempt {}/{})", attempt, max_attempts);
                }
                Ok(payload) => {
                    log::debug!("Clipboard read succeeded on attempt {}", attempt);
                    return payload;
                }
                Err(e) => {
                    log::trace!(
                        "Clipboard read failed (attempt {}/{}): {}",
                        attempt,
                        max_attempts,
                        e
                    );
                }
            }

            if attempt < max_attempts {
                thread::sleep(self.retry_delay);
            }
        }

        log::info!("No image or file found on clipboard");
        ClipboardPayload::None
    }

    fn read_once(&self) -> Result<ClipboardPayload, ClipboardError> {
        if let Some(first) = self.clipboard.file_list()?.into_iter().next() {
            return Ok(ClipboardPayload::FilePath(first));
        }

        if let Some(path) = self
            .clipboard
            .text()?
            .as_deref()
            .and_then(file_reference_from_text)
        {
            return Ok(ClipboardPayload::FilePath(path));
        }

        match self.clipboard.image()? {
            Some(image) if !image.rgba.is_empty() => Ok(ClipboardPayload::Image(image)),
            _ => Ok(ClipboardPayload::None),
        }
    }

    /// Signature of the current clipboard image, or `Empty` if none can be read.
    pub fn fingerprint(&self) -> ClipboardFingerprint {
        for attempt in 1..=FINGERPRINT_ATTEMPTS {
            match self.clipboard.image() {
                Ok(Some(image)) => return fingerprint_of(&image),
                Ok(None) => return ClipboardFingerprint::Empty,
                Err(e) => {
                    log::trace!("Fingerprint read failed (attempt {}): {}", attempt, e);
                    if attempt < FINGERPRINT_ATTEMPTS {
                        thread::sleep(self.retry_delay);
                    }
                }
            }
        }
        ClipboardFingerprint::Empty
    }
}

/// Dimensions plus a SHA-256 over an evenly strided sample of the pixels.
pub fn fingerprint_of(image: &ClipboardImage) -> ClipboardFingerprint {
    if image.rgba.is_empty() {
        return ClipboardFingerprint::Empty;
    }

    let bytes = &image.rgba;
    let mut hasher = Sha256::new();
    if bytes.len() <= SAMPLE_BLOCKS * SAMPLE_BLOCK_LEN {
        hasher.update(bytes);
    } else {
        let step = bytes.len() / SAMPLE_BLOCKS;
        for block in 0..SAMPLE_BLOCKS {
            let start = block * step;
            hasher.update(&bytes[start..start + SAMPLE_BLOCK_LEN]);
        }
    }

    ClipboardFingerprint::Image {
        width: image.width,
        height: image.height,
        digest: hex::encode(hasher.finalize()),
    }
}

/// Interpret clipboard text as a reference to an existing file.
///
/// Accepts a single line holding an absolute path (optionally double-quoted)
/// or a `file://` URI.
pub fn file_reference_from_text(text: &str) -> Option<PathBuf> {
    let text = text.trim();
    if text.is_empty() || text.contains(['\n', '\r']) {
        return None;
    }
    let text = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);

    let path = if text.starts_with("file://") {
        url::Url::parse(text).ok()?.to_file_path().ok()?
    } else {
        PathBuf::from(text)
    };

    (path.is_absolute() && path.is_file()).then_some(path)
}
