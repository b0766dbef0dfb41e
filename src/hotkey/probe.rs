//! Key-state probes used to notice a cancel key press during the wait.

use std::sync::OnceLock;

use super::helper;

/// Reports whether a key is currently held down.
pub trait KeyStateProbe: Send + Sync {
    fn is_pressed(&self, vk: u16) -> bool;

    /// Expensive probes are consulted less often than every poll tick.
    fn is_expensive(&self) -> bool {
        false
    }
}

/// Pick the cheapest probe that works here.
pub fn default_probe() -> Box<dyn KeyStateProbe> {
    if cfg!(windows) {
        Box::new(AsyncKeyStateProbe)
    } else if helper::is_available() {
        Box::new(PowerShellKeyProbe)
    } else {
        log::warn!("No key-state probe available; the wait cannot be cancelled");
        Box::new(NoKeyProbe)
    }
}

/// `GetAsyncKeyState` called in-process.
pub struct AsyncKeyStateProbe;

impl KeyStateProbe for AsyncKeyStateProbe {
    #[cfg(windows)]
    fn is_pressed(&self, vk: u16) -> bool {
        use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

        let state = unsafe { GetAsyncKeyState(i32::from(vk)) };
        is_down(state)
    }

    #[cfg(not(windows))]
    fn is_pressed(&self, _vk: u16) -> bool {
        false
    }
}

/// `GetAsyncKeyState` through a `powershell.exe` helper process.
pub struct PowerShellKeyProbe;

impl KeyStateProbe for PowerShellKeyProbe {
    fn is_pressed(&self, vk: u16) -> bool {
        let script = format!("{}$k::GetAsyncKeyState(0x{vk:02X})\n", helper::USER32_PRELUDE);
        match helper::run_script(&script) {
            Ok(output) => output.trim().parse::<i16>().is_ok_and(is_down),
            Err(e) => {
                log::debug!("Key-state probe failed: {}", e);
                false
            }
        }
    }

    fn is_expensive(&self) -> bool {
        true
    }
}

/// Never reports a key press.
pub struct NoKeyProbe;

impl KeyStateProbe for NoKeyProbe {
    fn is_pressed(&self, _vk: u16) -> bool {
        false
    }
}

type ProbeFactory = Box<dyn Fn() -> Box<dyn KeyStateProbe> + Send + Sync>;

/// Picks its probe on first use, so runs that never wait never pay for it.
pub struct LazyProbe {
    factory: ProbeFactory,
    probe: OnceLock<Box<dyn KeyStateProbe>>,
}

impl Default for LazyProbe {
    fn default() -> Self {
        Self::new(default_probe)
    }
}

impl LazyProbe {
    pub fn new(factory: impl Fn() -> Box<dyn KeyStateProbe> + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            probe: OnceLock::new(),
        }
    }

    fn get(&self) -> &dyn KeyStateProbe {
        self.probe.get_or_init(|| (self.factory)()).as_ref()
    }
}

impl KeyStateProbe for LazyProbe {
    fn is_pressed(&self, vk: u16) -> bool {
        self.get().is_pressed(vk)
    }

    fn is_expensive(&self) -> bool {
        self.get().is_expensive()
    }
}

/// The high bit of a `GetAsyncKeyState` result means "currently down".
fn is_down(state: i16) -> bool {
    (state as u16) & 0x8000 != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_bit_means_pressed() {
        assert!(is_down(i16::MIN));
        assert!(is_down(-32767));
        assert!(!is_down(1));
        assert!(!is_down(0));
    }

    #[test]
    fn helper_probe_is_rate_limited() {
        assert!(PowerShellKeyProbe.is_expensive());
        assert!(!AsyncKeyStateProbe.is_expensive());
        assert!(!NoKeyProbe.is_pressed(0x1B));
    }

    #[test]
    fn key_state_source_is_built_on_first_use_only() {
        use std::sync::{Arc, Mutex};

        let built = Arc::new(Mutex::new(0usize));
        let counter = built.clone();
        let lazy = LazyProbe::new(move || {
            *counter.lock().unwrap() += 1;
            Box::new(PowerShellKeyProbe) as Box<dyn KeyStateProbe>
        });
        assert_eq!(*built.lock().unwrap(), 0);

        assert!(lazy.is_expensive());
        assert!(lazy.is_expensive());
        assert_eq!(*built.lock().unwrap(), 1);
    }
}
