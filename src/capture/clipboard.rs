//! Access to the system clipboard.
//!
//! Images and text go through `arboard`; the Explorer file-drop list is read
//! natively on Windows. Every call opens the clipboard afresh, so a read can
//! fail with [`ClipboardError::Busy`] whenever another process holds it.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use super::types::{ClipboardError, ClipboardImage};

/// Typed reads and writes of the shared clipboard.
pub trait ClipboardAccess: Send + Sync {
    /// Paths on the clipboard's file-drop list, empty if there is none.
    fn file_list(&self) -> Result<Vec<PathBuf>, ClipboardError>;

    fn text(&self) -> Result<Option<String>, ClipboardError>;

    fn image(&self) -> Result<Option<ClipboardImage>, ClipboardError>;

    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The real clipboard of the machine this process runs on.
pub struct SystemClipboard;

impl ClipboardAccess for SystemClipboard {
    fn file_list(&self) -> Result<Vec<PathBuf>, ClipboardError> {
        read_file_drop()
    }

    fn text(&self) -> Result<Option<String>, ClipboardError> {
        let mut clipboard = open()?;
        absent_as_none(clipboard.get_text())
    }

    fn image(&self) -> Result<Option<ClipboardImage>, ClipboardError> {
        let mut clipboard = open()?;
        let image = absent_as_none(clipboard.get_image())?;
        Ok(image.map(|image| ClipboardImage {
            width: image.width,
            height: image.height,
            rgba: image.bytes.into_owned(),
        }))
    }

    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = open()?;
        clipboard.set_text(text).map_err(classify)
    }
}

fn open() -> Result<arboard::Clipboard, ClipboardError> {
    arboard::Clipboard::new().map_err(classify)
}

fn classify(err: arboard::Error) -> ClipboardError {
    match err {
        arboard::Error::ClipboardOccupied => ClipboardError::Busy,
        other => ClipboardError::Unavailable(other.to_string()),
    }
}

fn absent_as_none<T>(result: Result<T, arboard::Error>) -> Result<Option<T>, ClipboardError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(arboard::Error::ContentNotAvailable) => Ok(None),
        Err(err) => Err(classify(err)),
    }
}

#[cfg(windows)]
fn read_file_drop() -> Result<Vec<PathBuf>, ClipboardError> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use windows::Win32::System::DataExchange::{CloseClipboard, GetClipboardData, OpenClipboard};
    use windows::Win32::UI::Shell::{DragQueryFileW, HDROP};

    const CF_HDROP: u32 = 15;

    let mut files = Vec::new();
    unsafe {
        if OpenClipboard(None).is_err() {
            return Err(ClipboardError::Busy);
        }

        if let Ok(handle) = GetClipboardData(CF_HDROP) {
            let hdrop = HDROP(handle.0);
            let count = DragQueryFileW(hdrop, u32::MAX, None);
            for index in 0..count {
                let len = DragQueryFileW(hdrop, index, None) as usize;
                let mut buffer = vec![0u16; len + 1];
                let copied = DragQueryFileW(hdrop, index, Some(&mut buffer)) as usize;
                buffer.truncate(copied);
                files.push(PathBuf::from(OsString::from_wide(&buffer)));
            }
        }

        let _ = CloseClipboard();
    }

    log::trace!("File-drop list: {:?}", files);
    Ok(files)
}

#[cfg(not(windows))]
fn read_file_drop() -> Result<Vec<PathBuf>, ClipboardError> {
    Ok(Vec::new())
}

/// Write `text` to the clipboard, retrying while it is busy.
///
/// Returns whether the write eventually succeeded.
pub fn publish_text(clipboard: &dyn ClipboardAccess, text: &str, attempts: u32) -> bool {
    const RETRY_DELAY: Duration = Duration::from_millis(50);

    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        match clipboard.set_text(text) {
            Ok(()) => {
                log::debug!("Published {:?} to clipboard", text);
                return true;
            }
            Err(e) => {
                log::trace!(
                    "Clipboard write failed (attempt {}/{}): {}",
                    attempt,
                    attempts,
                    e
                );
            }
        }
        if attempt < attempts {
            thread::sleep(RETRY_DELAY);
        }
    }

    log::warn!("Could not write {:?} to clipboard after {} attempts", text, attempts);
    false
}
