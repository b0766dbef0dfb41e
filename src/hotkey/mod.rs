//! Hotkey parsing and simulation.
//!
//! A hotkey is written as `Modifier+...+Key`, e.g. `Ctrl+Shift+F1`, or as the
//! name of a shell-owned shortcut such as `ScreenClip`. `Win+Shift+S` is
//! recognised as the same shortcut as `ScreenClip`.

mod helper;
pub mod inject;
pub mod keys;
pub mod probe;
mod simulator;

pub use inject::{KeyInjector, KeyStroke, ShortcutLauncher};
pub use keys::{Key, Modifier, NamedKey, SystemShortcut};
pub use probe::KeyStateProbe;
pub use simulator::HotkeySimulator;

use std::fmt;

/// A parsed key combination, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeySpec {
    modifiers: Vec<Modifier>,
    target: HotkeyTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HotkeyTarget {
    Key(Key),
    System(SystemShortcut),
}

impl HotkeySpec {
    /// Parse a hotkey string like "Ctrl+Shift+W" or "ScreenClip".
    /// Modifiers keep the order they are written in and are pressed in that order.
    /// Supports spaces around '+' (e.g., "Ctrl + Shift + W").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty hotkey string".to_string());
        }

        let mut modifiers = Vec::new();
        let mut target = None;

        for part in s.split('+').map(str::trim) {
            if part.is_empty() {
                return Err(format!("Empty key name in: {}", s));
            }

            if let Some(modifier) = Modifier::parse(part) {
                if modifiers.contains(&modifier) {
                    return Err(format!("Duplicate modifier {:?} in: {}", modifier, s));
                }
                modifiers.push(modifier);
                continue;
            }

            if target.is_some() {
                return Err(format!("More than one key in: {}", s));
            }
            target = Some(match SystemShortcut::parse(part) {
                Some(shortcut) => HotkeyTarget::System(shortcut),
                None => HotkeyTarget::Key(Key::parse(part)?),
            });
        }

        let target = target.ok_or_else(|| format!("No key specified in: {}", s))?;
        if matches!(target, HotkeyTarget::System(_)) && !modifiers.is_empty() {
            return Err(format!("System shortcut cannot take modifiers: {}", s));
        }

        Ok(Self { modifiers, target })
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// The terminal key, unless this spec names a system shortcut.
    pub fn key(&self) -> Option<Key> {
        match self.target {
            HotkeyTarget::Key(key) => Some(key),
            HotkeyTarget::System(_) => None,
        }
    }

    /// The shell-owned shortcut this combination stands for, if any.
    pub fn system_shortcut(&self) -> Option<SystemShortcut> {
        match self.target {
            HotkeyTarget::System(shortcut) => Some(shortcut),
            HotkeyTarget::Key(Key::Char('S'))
                if self.modifiers.len() == 2
                    && self.modifiers.contains(&Modifier::Win)
                    && self.modifiers.contains(&Modifier::Shift) =>
            {
                Some(SystemShortcut::ScreenClip)
            }
            HotkeyTarget::Key(_) => None,
        }
    }

    /// Virtual-key codes in press order: modifiers as written, then the key.
    pub fn virtual_keys(&self) -> Vec<u16> {
        let mut codes: Vec<u16> = self.modifiers.iter().map(|m| m.virtual_key()).collect();
        if let Some(key) = self.key() {
            codes.push(key.virtual_key());
        }
        codes
    }
}

impl fmt::Display for HotkeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{:?}+", modifier)?;
        }
        match self.target {
            HotkeyTarget::Key(key) => write!(f, "{key}"),
            HotkeyTarget::System(shortcut) => write!(f, "{shortcut:?}"),
        }
    }
}
