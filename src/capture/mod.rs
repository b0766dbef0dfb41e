//! Screenshot capture for wslpaste.
//!
//! This module provides the capture pipeline:
//! - Firing the capture hotkey and waiting for the clipboard to change
//! - Contention-tolerant clipboard reads
//! - Scratch file storage with age-based cleanup
//! - Host to guest path translation and publication

pub mod clipboard;
pub mod file;
pub mod paths;
pub mod reader;
pub mod types;
pub mod watcher;

mod dependencies;
mod pipeline;
#[cfg(test)]
mod tests;

pub use dependencies::{CaptureDependencies, CaptureTrigger, ImageStore};
pub use pipeline::{CaptureOrchestrator, CaptureSettings};
pub use types::{CaptureError, CaptureMode, CaptureOutcome, quote_for_shell};
