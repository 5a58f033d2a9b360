//! Deadline-bounded waiting
//!
//! Foreground code that hands work to an interrupt waits through [`Wait`].
//! The execution environment decides how to suspend: a cooperative scheduler
//! yields to other tasks, a bare loop sleeps or delays. Implementations must
//! not mask interrupts while waiting, since completion is usually signalled
//! from one.

use core::time::Duration;

/// Outcome of a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitStatus {
    /// The predicate became true
    Completed,
    /// The deadline passed first
    TimedOut,
}

/// Wait until a predicate holds or a timeout elapses
pub trait Wait {
    /// Poll `done` until it returns true or `timeout` elapses
    ///
    /// `done` is checked at least once, so a condition that already holds
    /// completes even with a zero timeout.
    fn wait(&mut self, timeout: Duration, done: &mut dyn FnMut() -> bool) -> WaitStatus;
}

impl<W: Wait + ?Sized> Wait for &mut W {
    fn wait(&mut self, timeout: Duration, done: &mut dyn FnMut() -> bool) -> WaitStatus {
        (**self).wait(timeout, done)
    }
}
