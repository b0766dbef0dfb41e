use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::capture::{
    clipboard::{ClipboardAccess, SystemClipboard},
    file::TempFileStore,
    types::CaptureError,
};
use crate::hotkey::{HotkeySimulator, HotkeySpec, KeyStateProbe, probe::LazyProbe};

/// Abstraction over durable storage of captured images.
pub trait ImageStore: Send + Sync {
    fn save(&self, png: &[u8]) -> Result<PathBuf, CaptureError>;

    /// Remove stored images older than `max_age`. Never fails.
    fn sweep(&self, max_age: Duration);
}

/// Abstraction over firing the capture hotkey.
pub trait CaptureTrigger: Send + Sync {
    fn fire(&self, spec: &HotkeySpec) -> Result<(), CaptureError>;
}

/// Bundle of dependencies used by the capture pipeline. Each component can be mocked in tests.
#[derive(Clone)]
pub struct CaptureDependencies {
    pub clipboard: Arc<dyn ClipboardAccess>,
    pub store: Arc<dyn ImageStore>,
    pub trigger: Arc<dyn CaptureTrigger>,
    pub probe: Arc<dyn KeyStateProbe>,
}

impl CaptureDependencies {
    /// The real clipboard, input injection and key probe, storing into `store`.
    ///
    /// The key probe is chosen when a wait first needs it.
    pub fn system(store: TempFileStore) -> Self {
        Self {
            clipboard: Arc::new(SystemClipboard),
            store: Arc::new(store),
            trigger: Arc::new(HotkeySimulator::default()),
            probe: Arc::new(LazyProbe::default()),
        }
    }
}

impl ImageStore for TempFileStore {
    fn save(&self, png: &[u8]) -> Result<PathBuf, CaptureError> {
        TempFileStore::save(self, png)
    }

    fn sweep(&self, max_age: Duration) {
        TempFileStore::sweep(self, max_age);
    }
}

impl CaptureTrigger for HotkeySimulator {
    fn fire(&self, spec: &HotkeySpec) -> Result<(), CaptureError> {
        self.simulate(spec)
    }
}
