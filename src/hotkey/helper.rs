//! Running short PowerShell scripts on the Windows host.
//!
//! `powershell.exe` is reachable both natively and from inside WSL through
//! interop, so it backs the fallback injection and key-state strategies.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::capture::CaptureError;

const POWERSHELL: &str = "powershell.exe";
const HELPER_TIMEOUT: Duration = Duration::from_secs(5);

/// Declares `[WslPaste.Kbd]` with the two user32 entry points the scripts need.
pub(crate) const USER32_PRELUDE: &str = concat!(
    "$k = Add-Type -Name Kbd -Namespace WslPaste -PassThru -MemberDefinition '",
    "[DllImport(\"user32.dll\")] public static extern void keybd_event(",
    "byte bVk, byte bScan, uint dwFlags, System.UIntPtr dwExtraInfo);",
    "[DllImport(\"user32.dll\")] public static extern short GetAsyncKeyState(int vKey);'\n",
);

/// Check whether `powershell.exe` can be started at all.
pub(crate) fn is_available() -> bool {
    Command::new(POWERSHELL)
        .args(["-NoProfile", "-NonInteractive", "-Command", "exit 0"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Run `script` through PowerShell's stdin and return its stdout.
pub(crate) fn run_script(script: &str) -> Result<String, CaptureError> {
    let mut child = Command::new(POWERSHELL)
        .args(["-NoProfile", "-NonInteractive", "-Command", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            CaptureError::ToolUnavailable(format!(
                "Failed to spawn {} (is Windows interop enabled?): {}",
                POWERSHELL, e
            ))
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(script.as_bytes()).map_err(|e| {
            CaptureError::ToolUnavailable(format!("Failed to write to {} stdin: {}", POWERSHELL, e))
        })?;
    }

    let deadline = Instant::now() + HELPER_TIMEOUT;
    let status = loop {
        let polled = child.try_wait().map_err(|e| {
            CaptureError::ToolUnavailable(format!("Failed to wait for {}: {}", POWERSHELL, e))
        })?;
        match polled {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CaptureError::ToolUnavailable(format!(
                    "{} did not finish within {:?}",
                    POWERSHELL, HELPER_TIMEOUT
                )));
            }
            None => thread::sleep(Duration::from_millis(10)),
        }
    };

    let mut stdout = String::new();
    if let Some(mut out) = child.stdout.take() {
        out.read_to_string(&mut stdout).map_err(|e| {
            CaptureError::ToolUnavailable(format!("Failed to read {} output: {}", POWERSHELL, e))
        })?;
    }

    if !status.success() {
        let mut stderr = String::new();
        if let Some(mut err) = child.stderr.take() {
            let _ = err.read_to_string(&mut stderr);
        }
        return Err(CaptureError::ToolUnavailable(format!(
            "{} failed: {}",
            POWERSHELL,
            stderr.trim()
        )));
    }

    log::trace!("{} completed: {:?}", POWERSHELL, stdout.trim());
    Ok(stdout)
}
