use std::{
    fmt,
    io::Cursor,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use crate::capture::{
    clipboard::publish_text,
    dependencies::CaptureDependencies,
    paths::PathTranslator,
    reader::ClipboardReader,
    types::{
        CaptureError, CaptureMode, CaptureOutcome, ClipboardImage, ClipboardPayload,
        quote_for_shell,
    },
    watcher::{ChangeWatcher, PollingWatcher, WaitResult},
};
use crate::config::Config;
use crate::hotkey::{HotkeySpec, Key};

const PUBLISH_ATTEMPTS: u32 = 3;
const READ_RETRY_DELAY: Duration = Duration::from_millis(50);
/// Poll ticks per cancel check when the key state comes from a helper process.
const SLOW_CANCEL_CHECK_TICKS: u32 = 3;

/// Per-run parameters, fixed when the run starts.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub cancel_key: Key,
    pub read_attempts: u32,
    pub retention: Duration,
    pub retry_delay: Duration,
    /// Write the quoted result back to the clipboard.
    pub publish: bool,
    pub translator: PathTranslator,
}

impl CaptureSettings {
    pub fn from_config(config: &Config) -> Result<Self, CaptureError> {
        let cancel_key =
            Key::parse(&config.capture.cancel_key).map_err(CaptureError::InvalidInput)?;
        Ok(Self {
            timeout: config.timeout(),
            poll_interval: config.poll_interval(),
            cancel_key,
            read_attempts: config.capture.read_attempts,
            retention: config.retention(),
            retry_delay: READ_RETRY_DELAY,
            publish: true,
            translator: PathTranslator::new(config.paths.mount_root.clone()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Triggering,
    Waiting,
    Reading,
    Persisting,
    Publishing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Runs one capture from trigger to published path.
///
/// `run` consumes the orchestrator; each invocation builds a fresh one.
pub struct CaptureOrchestrator {
    settings: CaptureSettings,
    dependencies: CaptureDependencies,
    stage: Stage,
}

impl CaptureOrchestrator {
    pub fn new(settings: CaptureSettings, dependencies: CaptureDependencies) -> Self {
        Self {
            settings,
            dependencies,
            stage: Stage::Idle,
        }
    }

    pub fn run(mut self, mode: &CaptureMode) -> CaptureOutcome {
        log::info!("Starting capture: {:?}", mode);

        // Cleanup is best effort and happens before anything else.
        self.dependencies.store.sweep(self.settings.retention);

        let outcome = match self.execute(mode) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("Capture failed in {} stage: {}", self.stage, err);
                err.into()
            }
        };

        self.transition(Stage::Done);
        log::info!("Capture finished: {:?}", outcome);
        outcome
    }

    fn execute(&mut self, mode: &CaptureMode) -> Result<CaptureOutcome, CaptureError> {
        let reader = ClipboardReader::new(Arc::clone(&self.dependencies.clipboard))
            .with_retry_delay(self.settings.retry_delay);

        if let CaptureMode::Hotkey(spec) = mode {
            match self.trigger_and_wait(spec, &reader)? {
                WaitResult::Changed => {}
                WaitResult::TimedOut => return Ok(CaptureOutcome::Timeout),
                WaitResult::Cancelled => return Ok(CaptureOutcome::Cancelled),
            }
        }

        self.transition(Stage::Reading);
        let host_path = match reader.read(self.settings.read_attempts) {
            ClipboardPayload::None => return Ok(CaptureOutcome::Empty),
            ClipboardPayload::FilePath(path) => {
                log::info!("Clipboard references existing file {}", path.display());
                path
            }
            ClipboardPayload::Image(image) => self.persist(image)?,
        };

        self.transition(Stage::Publishing);
        Ok(CaptureOutcome::Success(self.publish(&host_path)))
    }

    fn trigger_and_wait(
        &mut self,
        spec: &HotkeySpec,
        reader: &ClipboardReader,
    ) -> Result<WaitResult, CaptureError> {
        self.transition(Stage::Triggering);

        // Must precede the trigger, or a fast capture tool can race the snapshot.
        let baseline = reader.fingerprint();
        log::debug!("Baseline fingerprint: {:?}", baseline);

        self.dependencies.trigger.fire(spec)?;

        self.transition(Stage::Waiting);
        let cancel_interval = if self.dependencies.probe.is_expensive() {
            self.settings.poll_interval * SLOW_CANCEL_CHECK_TICKS
        } else {
            Duration::ZERO
        };
        let watcher =
            PollingWatcher::new(reader.clone(), self.settings.poll_interval, cancel_interval);

        let probe = Arc::clone(&self.dependencies.probe);
        let cancel_vk = self.settings.cancel_key.virtual_key();
        let mut cancel = move || probe.is_pressed(cancel_vk);

        log::info!(
            "Waiting up to {:?} for a new screenshot ({} cancels)",
            self.settings.timeout,
            self.settings.cancel_key
        );
        Ok(watcher.wait_for_change(&baseline, self.settings.timeout, &mut cancel))
    }

    fn persist(&mut self, image: ClipboardImage) -> Result<PathBuf, CaptureError> {
        self.transition(Stage::Persisting);
        log::info!("Clipboard holds a {}x{} image", image.width, image.height);
        let png = encode_png(image)?;
        self.dependencies.store.save(&png)
    }

    fn publish(&self, host_path: &Path) -> String {
        let guest_path = self
            .settings
            .translator
            .to_guest_path(&host_path.to_string_lossy());

        if self.settings.publish {
            publish_text(
                self.dependencies.clipboard.as_ref(),
                &quote_for_shell(&guest_path),
                PUBLISH_ATTEMPTS,
            );
        } else {
            log::debug!("Clipboard publication disabled");
        }
        guest_path
    }

    fn transition(&mut self, next: Stage) {
        log::debug!("Capture stage {} -> {}", self.stage, next);
        self.stage = next;
    }
}

/// Encode RGBA8 clipboard pixels as PNG.
pub(crate) fn encode_png(image: ClipboardImage) -> Result<Vec<u8>, CaptureError> {
    let (width, height) = match (u32::try_from(image.width), u32::try_from(image.height)) {
        (Ok(width), Ok(height)) => (width, height),
        _ => {
            return Err(CaptureError::ImageError(format!(
                "image too large: {}x{}",
                image.width, image.height
            )));
        }
    };

    let buffer = image::RgbaImage::from_raw(width, height, image.rgba).ok_or_else(|| {
        CaptureError::ImageError(format!("pixel buffer does not match {}x{}", width, height))
    })?;

    let mut png = Vec::new();
    buffer
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| CaptureError::ImageError(format!("PNG encoding failed: {}", e)))?;
    Ok(png)
}
