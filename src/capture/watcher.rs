//! Waiting for the clipboard to change.
//!
//! There is no clipboard-change subscription here: the watcher polls the
//! clipboard fingerprint on a fixed tick and compares it with a baseline.
//! Callers only see [`ChangeWatcher`], so a notification-based implementation
//! could replace the polling one.

use std::thread;
use std::time::{Duration, Instant};

use super::reader::ClipboardReader;
use super::types::ClipboardFingerprint;

/// How a wait for new clipboard content ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    Changed,
    TimedOut,
    Cancelled,
}

pub trait ChangeWatcher {
    /// Block until the clipboard image differs from `baseline`, `cancel`
    /// reports true, or `timeout` elapses.
    fn wait_for_change(
        &self,
        baseline: &ClipboardFingerprint,
        timeout: Duration,
        cancel: &mut dyn FnMut() -> bool,
    ) -> WaitResult;
}

/// Fixed-interval fingerprint polling on the calling thread.
pub struct PollingWatcher {
    reader: ClipboardReader,
    tick: Duration,
    /// Minimum time between cancel checks. Zero checks on every tick.
    cancel_interval: Duration,
}

impl PollingWatcher {
    pub fn new(reader: ClipboardReader, tick: Duration, cancel_interval: Duration) -> Self {
        Self {
            reader,
            tick,
            cancel_interval,
        }
    }

    /// Free cancel checks also run on the tick the timeout
    /// passes; throttled ones only run when they can finish before it.
    fn should_check_cancel(
        &self,
        now: Instant,
        next_check: Instant,
        deadline: Instant,
        cost: Duration,
    ) -> bool {
        if self.cancel_interval.is_zero() {
            return true;
        }
        now >= next_check && now + cost < deadline
    }
}

impl ChangeWatcher for PollingWatcher {
    fn wait_for_change(
        &self,
        baseline: &ClipboardFingerprint,
        timeout: Duration,
        cancel: &mut dyn FnMut() -> bool,
    ) -> WaitResult {
        let started = Instant::now();
        let deadline = started + timeout;
        let mut next_check = started;
        let mut check_cost = Duration::ZERO;

        loop {
            thread::sleep(self.tick);

            let current = self.reader.fingerprint();
            if !current.is_empty() && current != *baseline {
                log::debug!(
                    "Clipboard changed after {:?}: {:?}",
                    started.elapsed(),
                    current
                );
                return WaitResult::Changed;
            }

            let now = Instant::now();
            if self.should_check_cancel(now, next_check, deadline, check_cost) {
                let cancelled = cancel();
                check_cost = now.elapsed();
                if cancelled {
                    log::debug!("Wait cancelled after {:?}", started.elapsed());
                    return WaitResult::Cancelled;
                }
                next_check = Instant::now() + self.cancel_interval;
            }

            if Instant::now() >= deadline {
                log::debug!("No clipboard change within {:?}", timeout);
                return WaitResult::TimedOut;
            }
        }
    }
}
