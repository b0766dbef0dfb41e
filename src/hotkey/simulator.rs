use std::time::Duration;

use super::HotkeySpec;
use super::inject::{KeyInjector, KeyStroke, ProtocolLauncher, ShortcutLauncher, default_injectors};
use crate::capture::CaptureError;

/// How long all keys stay down so polling applications see them together.
const SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Fires a [`HotkeySpec`] using the first available injection strategy.
pub struct HotkeySimulator {
    injectors: Vec<Box<dyn KeyInjector>>,
    launcher: Box<dyn ShortcutLauncher>,
}

impl Default for HotkeySimulator {
    fn default() -> Self {
        Self::new(default_injectors(), Box::new(ProtocolLauncher))
    }
}

impl HotkeySimulator {
    /// `injectors` are tried in the given order; the first available one is used.
    pub fn new(injectors: Vec<Box<dyn KeyInjector>>, launcher: Box<dyn ShortcutLauncher>) -> Self {
        Self {
            injectors,
            launcher,
        }
    }

    pub fn simulate(&self, spec: &HotkeySpec) -> Result<(), CaptureError> {
        if let Some(shortcut) = spec.system_shortcut() {
            log::debug!("{} is a system shortcut, launching {:?}", spec, shortcut);
            return self.launcher.launch(shortcut);
        }

        let injector = self
            .injectors
            .iter()
            .find(|injector| injector.is_available())
            .ok_or_else(|| {
                let tried: Vec<&str> = self.injectors.iter().map(|i| i.name()).collect();
                CaptureError::ToolUnavailable(format!(
                    "No key injection method available (tried: {})",
                    tried.join(", ")
                ))
            })?;

        log::info!("Sending {} via {}", spec, injector.name());
        injector.inject(&key_strokes(spec))
    }
}

/// Press every key in order, hold, then release in reverse order so the
/// terminal key comes up before its modifiers.
pub(crate) fn key_strokes(spec: &HotkeySpec) -> Vec<KeyStroke> {
    let codes = spec.virtual_keys();
    let mut strokes: Vec<KeyStroke> = codes.iter().map(|&vk| KeyStroke::Down(vk)).collect();
    strokes.push(KeyStroke::Settle(SETTLE_DELAY));
    strokes.extend(codes.iter().rev().map(|&vk| KeyStroke::Up(vk)));
    strokes
}
