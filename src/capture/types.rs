//! Data types for the capture pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::hotkey::HotkeySpec;

/// How a capture run obtains its image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureMode {
    /// Process whatever the clipboard holds right now.
    Direct,
    /// Fire the hotkey, then wait for the clipboard to change.
    Hotkey(HotkeySpec),
}

/// Raw image pixels as delivered by the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardImage {
    pub width: usize,
    pub height: usize,
    /// RGBA8, row-major, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

/// Typed clipboard content, consumed once per capture run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardPayload {
    Image(ClipboardImage),
    FilePath(PathBuf),
    None,
}

/// Cheap signature of the clipboard's image content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardFingerprint {
    /// No readable image on the clipboard.
    Empty,
    Image {
        width: usize,
        height: usize,
        digest: String,
    },
}

impl ClipboardFingerprint {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Terminal value of one capture run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The unquoted guest path that was published.
    Success(String),
    Timeout,
    Cancelled,
    Empty,
    ToolUnavailable(String),
    Error(String),
}

impl CaptureOutcome {
    /// Process exit code reported for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success(_) => 0,
            Self::Timeout | Self::Cancelled => 1,
            Self::Empty => 2,
            Self::ToolUnavailable(_) | Self::Error(_) => 3,
        }
    }

    /// One-line human readable summary.
    pub fn message(&self) -> String {
        match self {
            Self::Success(path) => format!("Copied: {}", quote_for_shell(path)),
            Self::Timeout => "Timed out waiting for a screenshot".to_string(),
            Self::Cancelled => "Cancelled".to_string(),
            Self::Empty => "No image or file on the clipboard".to_string(),
            Self::ToolUnavailable(reason) => format!("Capture tool unavailable: {}", reason),
            Self::Error(reason) => format!("Error: {}", reason),
        }
    }
}

impl From<CaptureError> for CaptureOutcome {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::ToolUnavailable(reason) => Self::ToolUnavailable(reason),
            other => Self::Error(other.to_string()),
        }
    }
}

/// Wrap a path in single quotes so it survives a shell command line.
pub fn quote_for_shell(path: &str) -> String {
    format!("'{}'", path.replace('\'', r"'\''"))
}

/// Errors from reaching the shared clipboard.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Another process holds the clipboard open; retrying shortly may succeed.
    #[error("clipboard is busy")]
    Busy,

    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur during a capture run.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("{0}")]
    ToolUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Clipboard operation failed: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Failed to save screenshot: {0}")]
    SaveError(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageError(String),
}
