use std::thread;
use std::time::{Duration, Instant};

use crate::dom::page::PageError;

/// Bounded wait-for-condition used after interactions that make the page
/// render new nodes (dropdown panels, cascader menus).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl WaitPolicy {
    /// Check once, never sleep.
    pub fn immediate() -> Self {
        Self {
            timeout: Duration::ZERO,
            poll_interval: Duration::ZERO,
        }
    }

    pub fn from_millis(timeout_ms: u64, poll_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            poll_interval: Duration::from_millis(poll_ms.max(1)),
        }
    }

    /// Run `check` until it yields a value or the timeout elapses. The check
    /// always runs at least once. Page errors abort the wait.
    pub fn wait_for<T>(
        &self,
        mut check: impl FnMut() -> Result<Option<T>, PageError>,
    ) -> Result<Option<T>, PageError> {
        let started = Instant::now();
        loop {
            if let Some(found) = check()? {
                return Ok(Some(found));
            }
            let elapsed = started.elapsed();
            if elapsed >= self.timeout {
                return Ok(None);
            }
            thread::sleep(self.poll_interval.min(self.timeout - elapsed));
        }
    }
}
