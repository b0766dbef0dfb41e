//! Input-injection strategies and the shell shortcut launcher.

use std::fmt::Write as _;
use std::process::{Command, Stdio};
use std::time::Duration;

use super::helper;
use super::keys::SystemShortcut;
use crate::capture::CaptureError;

/// One step of a synthesized key sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStroke {
    Down(u16),
    Up(u16),
    /// Hold the current key state for this long.
    Settle(Duration),
}

/// A way of delivering key events to the foreground application.
pub trait KeyInjector: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the underlying primitive can be reached on this system.
    fn is_available(&self) -> bool;

    fn inject(&self, strokes: &[KeyStroke]) -> Result<(), CaptureError>;
}

/// Opens shell-owned shortcuts through their native handler.
pub trait ShortcutLauncher: Send + Sync {
    fn launch(&self, shortcut: SystemShortcut) -> Result<(), CaptureError>;
}

/// Injection strategies in priority order.
pub fn default_injectors() -> Vec<Box<dyn KeyInjector>> {
    vec![Box::new(SendInputInjector), Box::new(PowerShellInjector)]
}

/// Native `SendInput` injection. Only available in Windows builds.
pub struct SendInputInjector;

impl KeyInjector for SendInputInjector {
    fn name(&self) -> &str {
        "SendInput"
    }

    fn is_available(&self) -> bool {
        cfg!(windows)
    }

    #[cfg(windows)]
    fn inject(&self, strokes: &[KeyStroke]) -> Result<(), CaptureError> {
        use windows::Win32::UI::Input::KeyboardAndMouse::{
            INPUT, INPUT_0, INPUT_KEYBOARD, KEYBD_EVENT_FLAGS, KEYBDINPUT, KEYEVENTF_KEYUP,
            SendInput, VIRTUAL_KEY,
        };

        let send = |vk: u16, flags: KEYBD_EVENT_FLAGS| -> Result<(), CaptureError> {
            let input = INPUT {
                r#type: INPUT_KEYBOARD,
                Anonymous: INPUT_0 {
                    ki: KEYBDINPUT {
                        wVk: VIRTUAL_KEY(vk),
                        wScan: 0,
                        dwFlags: flags,
                        time: 0,
                        dwExtraInfo: 0,
                    },
                },
            };
            let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
            if sent == 1 {
                Ok(())
            } else {
                Err(CaptureError::ToolUnavailable(format!(
                    "SendInput rejected key 0x{:02X}",
                    vk
                )))
            }
        };

        replay(strokes, |stroke| match stroke {
            KeyStroke::Down(vk) => send(vk, KEYBD_EVENT_FLAGS(0)),
            KeyStroke::Up(vk) => send(vk, KEYEVENTF_KEYUP),
            KeyStroke::Settle(delay) => {
                std::thread::sleep(delay);
                Ok(())
            }
        })
    }

    #[cfg(not(windows))]
    fn inject(&self, _strokes: &[KeyStroke]) -> Result<(), CaptureError> {
        Err(CaptureError::ToolUnavailable(
            "SendInput is only available on Windows".to_string(),
        ))
    }
}

/// Replays the sequence through a `powershell.exe` helper calling `keybd_event`.
pub struct PowerShellInjector;

impl KeyInjector for PowerShellInjector {
    fn name(&self) -> &str {
        "powershell"
    }

    fn is_available(&self) -> bool {
        helper::is_available()
    }

    fn inject(&self, strokes: &[KeyStroke]) -> Result<(), CaptureError> {
        let Err(err) = helper::run_script(&keybd_script(strokes)) else {
            return Ok(());
        };

        // The script may have died between its key-down and key-up lines.
        let release = release_strokes(strokes);
        if !release.is_empty() {
            if let Err(e) = helper::run_script(&keybd_script(&release)) {
                log::warn!("Failed to release keys after helper error: {}", e);
            }
        }
        Err(err)
    }
}

/// Deliver `strokes` through `send`, one at a time.
///
/// When a stroke fails, every key still held is released in reverse order
/// before the error is returned.
pub(crate) fn replay(
    strokes: &[KeyStroke],
    mut send: impl FnMut(KeyStroke) -> Result<(), CaptureError>,
) -> Result<(), CaptureError> {
    let mut held: Vec<u16> = Vec::new();
    for &stroke in strokes {
        if let Err(err) = send(stroke) {
            for &vk in held.iter().rev() {
                if let Err(e) = send(KeyStroke::Up(vk)) {
                    log::warn!("Failed to release key 0x{:02X}: {}", vk, e);
                }
            }
            return Err(err);
        }
        match stroke {
            KeyStroke::Down(vk) => held.push(vk),
            KeyStroke::Up(vk) => held.retain(|&h| h != vk),
            KeyStroke::Settle(_) => {}
        }
    }
    Ok(())
}

/// Key-up for every key `strokes` presses, last pressed first.
pub(crate) fn release_strokes(strokes: &[KeyStroke]) -> Vec<KeyStroke> {
    let mut release: Vec<KeyStroke> = Vec::new();
    for stroke in strokes.iter().rev() {
        if let KeyStroke::Down(vk) = *stroke {
            let up = KeyStroke::Up(vk);
            if !release.contains(&up) {
                release.push(up);
            }
        }
    }
    release
}

/// Build the PowerShell script replaying `strokes`.
pub(crate) fn keybd_script(strokes: &[KeyStroke]) -> String {
    const KEYEVENTF_KEYUP: u32 = 2;

    let mut script = String::from(helper::USER32_PRELUDE);
    for stroke in strokes {
        // Writing to a String cannot fail.
        let _ = match *stroke {
            KeyStroke::Down(vk) => {
                writeln!(script, "$k::keybd_event(0x{vk:02X}, 0, 0, [UIntPtr]::Zero)")
            }
            KeyStroke::Up(vk) => writeln!(
                script,
                "$k::keybd_event(0x{vk:02X}, 0, {KEYEVENTF_KEYUP}, [UIntPtr]::Zero)"
            ),
            KeyStroke::Settle(delay) => {
                writeln!(script, "Start-Sleep -Milliseconds {}", delay.as_millis())
            }
        };
    }
    script
}

/// Launches shell shortcuts by opening their protocol URI with `explorer.exe`.
pub struct ProtocolLauncher;

impl ShortcutLauncher for ProtocolLauncher {
    fn launch(&self, shortcut: SystemShortcut) -> Result<(), CaptureError> {
        let uri = shortcut.uri();
        log::info!("Launching {:?} via {}", shortcut, uri);

        // explorer.exe reports a non-zero status even when the handler started.
        let status = Command::new("explorer.exe")
            .arg(uri)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                CaptureError::ToolUnavailable(format!(
                    "Failed to launch {} (is explorer.exe reachable?): {}",
                    uri, e
                ))
            })?;
        log::debug!("explorer.exe {} exited with {}", uri, status);
        Ok(())
    }
}
