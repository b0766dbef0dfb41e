use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use tempfile::TempDir;

use super::{
    clipboard::ClipboardAccess,
    dependencies::{CaptureDependencies, CaptureTrigger, ImageStore},
    file::TempFileStore,
    paths::PathTranslator,
    pipeline::{CaptureOrchestrator, CaptureSettings, encode_png},
    types::{CaptureError, CaptureMode, CaptureOutcome, ClipboardError, ClipboardImage},
};
use crate::hotkey::{HotkeySpec, Key, KeyStateProbe, probe::LazyProbe};

#[derive(Default)]
struct MockClipboard {
    image: Mutex<Option<ClipboardImage>>,
    files: Vec<PathBuf>,
    writes: Mutex<Vec<String>>,
}

impl MockClipboard {
    fn with_image(image: ClipboardImage) -> Self {
        Self {
            image: Mutex::new(Some(image)),
            ..Default::default()
        }
    }

    fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl ClipboardAccess for MockClipboard {
    fn file_list(&self) -> Result<Vec<PathBuf>, ClipboardError> {
        Ok(self.files.clone())
    }

    fn text(&self) -> Result<Option<String>, ClipboardError> {
        Ok(None)
    }

    fn image(&self) -> Result<Option<ClipboardImage>, ClipboardError> {
        Ok(self.image.lock().unwrap().clone())
    }

    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Clone)]
struct MockStore {
    path: PathBuf,
    saves: Arc<Mutex<usize>>,
    sweeps: Arc<Mutex<usize>>,
}

impl MockStore {
    fn returning(path: &str) -> Self {
        Self {
            path: PathBuf::from(path),
            saves: Arc::new(Mutex::new(0)),
            sweeps: Arc::new(Mutex::new(0)),
        }
    }
}

impl ImageStore for MockStore {
    fn save(&self, png: &[u8]) -> Result<PathBuf, CaptureError> {
        assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
        *self.saves.lock().unwrap() += 1;
        Ok(self.path.clone())
    }

    fn sweep(&self, _max_age: Duration) {
        *self.sweeps.lock().unwrap() += 1;
    }
}

/// Records hotkeys fired; optionally fails or places a new image on the clipboard.
#[derive(Clone)]
struct MockTrigger {
    fired: Arc<Mutex<Vec<String>>>,
    error: Arc<Mutex<Option<CaptureError>>>,
    produces: Option<(Arc<MockClipboard>, ClipboardImage)>,
}

impl MockTrigger {
    fn idle() -> Self {
        Self {
            fired: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(None)),
            produces: None,
        }
    }
}

impl CaptureTrigger for MockTrigger {
    fn fire(&self, spec: &HotkeySpec) -> Result<(), CaptureError> {
        self.fired.lock().unwrap().push(spec.to_string());
        if let Some(err) = self.error.lock().unwrap().take() {
            return Err(err);
        }
        if let Some((clipboard, image)) = &self.produces {
            *clipboard.image.lock().unwrap() = Some(image.clone());
        }
        Ok(())
    }
}

#[derive(Clone)]
struct MockProbe {
    pressed: bool,
    probes: Arc<Mutex<Vec<u16>>>,
}

impl MockProbe {
    fn released() -> Self {
        Self {
            pressed: false,
            probes: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl KeyStateProbe for MockProbe {
    fn is_pressed(&self, vk: u16) -> bool {
        self.probes.lock().unwrap().push(vk);
        self.pressed
    }
}

fn image(width: usize, height: usize, fill: u8) -> ClipboardImage {
    ClipboardImage {
        width,
        height,
        rgba: vec![fill; width * height * 4],
    }
}

fn settings(timeout: Duration) -> CaptureSettings {
    CaptureSettings {
        timeout,
        poll_interval: Duration::from_millis(20),
        cancel_key: Key::parse("Escape").unwrap(),
        read_attempts: 3,
        retention: Duration::from_secs(24 * 3600),
        retry_delay: Duration::ZERO,
        publish: true,
        translator: PathTranslator::default(),
    }
}

fn deps(
    clipboard: &Arc<MockClipboard>,
    store: Arc<dyn ImageStore>,
    trigger: &MockTrigger,
    probe: &MockProbe,
) -> CaptureDependencies {
    CaptureDependencies {
        clipboard: clipboard.clone(),
        store,
        trigger: Arc::new(trigger.clone()),
        probe: Arc::new(probe.clone()),
    }
}

fn hotkey() -> CaptureMode {
    CaptureMode::Hotkey(HotkeySpec::parse("Ctrl+Shift+F1").unwrap())
}

fn file_count(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

#[test]
fn test_direct_mode_saves_image_into_scratch_directory() {
    let temp = TempDir::new().unwrap();
    let scratch = temp.path().join("wsl-paste-image");
    let clipboard = Arc::new(MockClipboard::with_image(image(800, 600, 42)));
    let store = Arc::new(TempFileStore::new(&scratch, "wsl_shot_"));

    let outcome = CaptureOrchestrator::new(
        settings(Duration::from_secs(1)),
        deps(&clipboard, store, &MockTrigger::idle(), &MockProbe::released()),
    )
    .run(&CaptureMode::Direct);

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(file_count(&scratch), 1);

    let CaptureOutcome::Success(path) = outcome else {
        panic!("expected success, got {:?}", outcome);
    };
    assert!(path.starts_with(&scratch.to_string_lossy().into_owned()));
    assert!(path.ends_with(".png"));
    let saved = image::open(&path).unwrap();
    assert_eq!((saved.width(), saved.height()), (800, 600));
    assert_eq!(clipboard.writes(), vec![format!("'{}'", path)]);
}

#[test]
fn test_direct_mode_translates_host_path() {
    let clipboard = Arc::new(MockClipboard::with_image(image(800, 600, 1)));
    let store = MockStore::returning(
        r"C:\Users\me\AppData\Local\Temp\wsl-paste-image\wsl_shot_20240102_030405.png",
    );

    let outcome = CaptureOrchestrator::new(
        settings(Duration::from_secs(1)),
        deps(
            &clipboard,
            Arc::new(store.clone()),
            &MockTrigger::idle(),
            &MockProbe::released(),
        ),
    )
    .run(&CaptureMode::Direct);

    let expected =
        "/mnt/c/Users/me/AppData/Local/Temp/wsl-paste-image/wsl_shot_20240102_030405.png";
    assert_eq!(outcome, CaptureOutcome::Success(expected.to_string()));
    assert_eq!(clipboard.writes(), vec![format!("'{}'", expected)]);
    assert_eq!(*store.saves.lock().unwrap(), 1);
    assert_eq!(*store.sweeps.lock().unwrap(), 1);
}

#[test]
fn test_hotkey_mode_times_out_without_clipboard_change() {
    let temp = TempDir::new().unwrap();
    let scratch = temp.path().join("scratch");
    let clipboard = Arc::new(MockClipboard::with_image(image(10, 10, 5)));
    let trigger = MockTrigger::idle();

    let outcome = CaptureOrchestrator::new(
        settings(Duration::from_millis(200)),
        deps(
            &clipboard,
            Arc::new(TempFileStore::new(&scratch, "wsl_shot_")),
            &trigger,
            &MockProbe::released(),
        ),
    )
    .run(&hotkey());

    assert_eq!(outcome, CaptureOutcome::Timeout);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(file_count(&scratch), 0);
    assert!(clipboard.writes().is_empty());
    assert_eq!(*trigger.fired.lock().unwrap(), vec!["Ctrl+Shift+F1"]);
}

#[test]
fn test_direct_mode_empty_clipboard() {
    let clipboard = Arc::new(MockClipboard::default());
    let store = MockStore::returning("unused.png");

    let outcome = CaptureOrchestrator::new(
        settings(Duration::from_secs(1)),
        deps(
            &clipboard,
            Arc::new(store.clone()),
            &MockTrigger::idle(),
            &MockProbe::released(),
        ),
    )
    .run(&CaptureMode::Direct);

    assert_eq!(outcome, CaptureOutcome::Empty);
    assert_eq!(outcome.exit_code(), 2);
    assert_eq!(*store.saves.lock().unwrap(), 0);
    assert!(clipboard.writes().is_empty());
}

#[test]
fn test_baseline_is_taken_before_trigger() {
    // The trigger replaces the clipboard image synchronously, so a baseline
    // taken afterwards would never see a change.
    let clipboard = Arc::new(MockClipboard::with_image(image(10, 10, 5)));
    let trigger = MockTrigger {
        produces: Some((clipboard.clone(), image(1920, 1080, 9))),
        ..MockTrigger::idle()
    };
    let store = MockStore::returning(r"C:\tmp\wsl_shot_1.png");

    let outcome = CaptureOrchestrator::new(
        settings(Duration::from_secs(2)),
        deps(
            &clipboard,
            Arc::new(store.clone()),
            &trigger,
            &MockProbe::released(),
        ),
    )
    .run(&hotkey());

    assert_eq!(outcome, CaptureOutcome::Success("/mnt/c/tmp/wsl_shot_1.png".to_string()));
    assert_eq!(*store.saves.lock().unwrap(), 1);
}

#[test]
fn test_cancel_key_aborts_wait() {
    let clipboard = Arc::new(MockClipboard::with_image(image(10, 10, 5)));
    let probe = MockProbe {
        pressed: true,
        ..MockProbe::released()
    };
    let store = MockStore::returning("unused.png");

    let started = Instant::now();
    let outcome = CaptureOrchestrator::new(
        settings(Duration::from_secs(10)),
        deps(&clipboard, Arc::new(store.clone()), &MockTrigger::idle(), &probe),
    )
    .run(&hotkey());

    assert_eq!(outcome, CaptureOutcome::Cancelled);
    assert_eq!(outcome.exit_code(), 1);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(*probe.probes.lock().unwrap(), vec![0x1B]);
    assert_eq!(*store.saves.lock().unwrap(), 0);
}

#[test]
fn test_file_reference_skips_persisting() {
    let clipboard = Arc::new(MockClipboard {
        image: Mutex::new(Some(image(4, 4, 1))),
        files: vec![PathBuf::from(r"D:\Pictures\Shot 1.png")],
        ..Default::default()
    });
    let store = MockStore::returning("unused.png");

    let outcome = CaptureOrchestrator::new(
        settings(Duration::from_secs(1)),
        deps(
            &clipboard,
            Arc::new(store.clone()),
            &MockTrigger::idle(),
            &MockProbe::released(),
        ),
    )
    .run(&CaptureMode::Direct);

    assert_eq!(
        outcome,
        CaptureOutcome::Success("/mnt/d/Pictures/Shot 1.png".to_string())
    );
    assert_eq!(*store.saves.lock().unwrap(), 0);
    assert_eq!(clipboard.writes(), vec!["'/mnt/d/Pictures/Shot 1.png'"]);
}

#[test]
fn test_trigger_failure_is_tool_unavailable() {
    let clipboard = Arc::new(MockClipboard::with_image(image(10, 10, 5)));
    let trigger = MockTrigger::idle();
    *trigger.error.lock().unwrap() = Some(CaptureError::ToolUnavailable(
        "No key injection method available (tried: SendInput, powershell.exe)".to_string(),
    ));
    let store = MockStore::returning("unused.png");

    let started = Instant::now();
    let outcome = CaptureOrchestrator::new(
        settings(Duration::from_secs(10)),
        deps(
            &clipboard,
            Arc::new(store.clone()),
            &trigger,
            &MockProbe::released(),
        ),
    )
    .run(&hotkey());

    assert!(matches!(outcome, CaptureOutcome::ToolUnavailable(_)));
    assert_eq!(outcome.exit_code(), 3);
    assert!(started.elapsed() < Duration::from_secs(2));
    // The sweep still ran at the start of the failed run.
    assert_eq!(*store.sweeps.lock().unwrap(), 1);
}

#[test]
fn test_no_publish_leaves_clipboard_alone() {
    let clipboard = Arc::new(MockClipboard::with_image(image(2, 2, 1)));
    let mut settings = settings(Duration::from_secs(1));
    settings.publish = false;

    let outcome = CaptureOrchestrator::new(
        settings,
        deps(
            &clipboard,
            Arc::new(MockStore::returning(r"C:\a.png")),
            &MockTrigger::idle(),
            &MockProbe::released(),
        ),
    )
    .run(&CaptureMode::Direct);

    assert_eq!(outcome, CaptureOutcome::Success("/mnt/c/a.png".to_string()));
    assert!(clipboard.writes().is_empty());
}

#[test]
fn test_sweep_runs_before_capture() {
    let temp = TempDir::new().unwrap();
    let stale = temp.path().join("wsl_shot_stale.png");
    fs::write(&stale, b"old").unwrap();
    fs::File::options()
        .write(true)
        .open(&stale)
        .unwrap()
        .set_modified(std::time::SystemTime::now() - Duration::from_secs(25 * 3600))
        .unwrap();

    let outcome = CaptureOrchestrator::new(
        settings(Duration::from_secs(1)),
        deps(
            &Arc::new(MockClipboard::default()),
            Arc::new(TempFileStore::new(temp.path(), "wsl_shot_")),
            &MockTrigger::idle(),
            &MockProbe::released(),
        ),
    )
    .run(&CaptureMode::Direct);

    assert_eq!(outcome, CaptureOutcome::Empty);
    assert!(!stale.exists());
}

#[test]
fn test_encode_png_rejects_mismatched_buffer() {
    let bad = ClipboardImage {
        width: 10,
        height: 10,
        rgba: vec![0; 12],
    };
    assert!(matches!(encode_png(bad), Err(CaptureError::ImageError(_))));

    let png = encode_png(image(3, 2, 255)).unwrap();
    assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
}

#[test]
fn test_direct_mode_never_builds_key_state_reader() {
    let clipboard = Arc::new(MockClipboard::with_image(image(2, 2, 1)));
    let built = Arc::new(Mutex::new(0usize));
    let counter = built.clone();
    let lazy = LazyProbe::new(move || {
        *counter.lock().unwrap() += 1;
        Box::new(MockProbe::released()) as Box<dyn KeyStateProbe>
    });

    let dependencies = CaptureDependencies {
        clipboard: clipboard.clone(),
        store: Arc::new(MockStore::returning(r"C:\a.png")),
        trigger: Arc::new(MockTrigger::idle()),
        probe: Arc::new(lazy),
    };
    let outcome = CaptureOrchestrator::new(settings(Duration::from_secs(1)), dependencies)
        .run(&CaptureMode::Direct);

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(*built.lock().unwrap(), 0);
}
