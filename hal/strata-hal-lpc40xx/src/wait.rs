//! Blocking wait built on a delay provider

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use strata_hal::wait::{Wait, WaitStatus};

/// Default interval between completion checks
pub const DEFAULT_POLL_INTERVAL_US: u32 = 10;

/// Polls the completion condition, sleeping on `D` in between
///
/// The deadline is counted in delay time, so time spent in interrupt
/// handlers stretches it slightly.
pub struct DelayWait<D> {
    delay: D,
    poll_interval_us: u32,
}

impl<D: DelayNs> DelayWait<D> {
    pub fn new(delay: D) -> Self {
        Self {
            delay,
            poll_interval_us: DEFAULT_POLL_INTERVAL_US,
        }
    }

    /// Check the condition every `interval_us` microseconds (at least one)
    pub fn with_poll_interval(mut self, interval_us: u32) -> Self {
        self.poll_interval_us = interval_us.max(1);
        self
    }

    /// Give back the delay provider
    pub fn release(self) -> D {
        self.delay
    }
}

impl<D: DelayNs> Wait for DelayWait<D> {
    fn wait(&mut self, timeout: Duration, done: &mut dyn FnMut() -> bool) -> WaitStatus {
        let budget_us = timeout.as_micros();
        let mut elapsed_us: u128 = 0;

        loop {
            if done() {
                return WaitStatus::Completed;
            }
            if elapsed_us >= budget_us {
                return WaitStatus::TimedOut;
            }
            self.delay.delay_us(self.poll_interval_us);
            elapsed_us += u128::from(self.poll_interval_us);
        }
    }
}
