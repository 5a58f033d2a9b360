//! Async I2C master driver
//!
//! Same transaction engine as [`I2c`](crate::I2c), but the caller's task
//! sleeps on the bus's waker instead of polling. The interrupt handler wakes
//! it when the record is handed back. Dropping the future mid-transaction
//! aborts the bus and revokes the buffers.

use core::future::poll_fn;
use core::task::Poll;

use embassy_time::{with_deadline, Duration, Instant};
use strata_hal::i2c::{I2cConfig, Transaction};
use strata_hal::wait::WaitStatus;

use crate::bus::Bus;
use crate::error::Error;
use crate::i2c::{hal_transaction, ActiveTransaction};
use crate::registers::{Lpc40xxRegisters, Registers};
use crate::transaction::TransactionSnapshot;

/// Interrupt-driven I2C master for async executors
pub struct AsyncI2c<R: 'static = Lpc40xxRegisters> {
    bus: &'static Bus<R>,
    config: I2cConfig,
}

impl<R: Registers + Sync> AsyncI2c<R> {
    /// Create a driver for an initialized `bus`
    pub fn new(bus: &'static Bus<R>, config: I2cConfig) -> Self {
        Self { bus, config }
    }

    /// Run `transaction` to completion or until its timeout passes
    pub async fn transaction(&mut self, mut transaction: Transaction<'_>) -> Result<(), Error> {
        let deadline = deadline_after(transaction.timeout);
        let active = ActiveTransaction::begin(self.bus, &mut transaction)?;
        let cell = self.bus.transaction;

        let released = poll_fn(|cx| {
            cell.waker().register(cx.waker());
            if cell.is_busy() {
                Poll::Pending
            } else {
                Poll::Ready(())
            }
        });

        let wait = match with_deadline(deadline, released).await {
            Ok(()) => WaitStatus::Completed,
            Err(_) => WaitStatus::TimedOut,
        };
        active.conclude(wait)
    }

    /// State of the last transaction on this bus
    pub fn transaction_info(&self) -> TransactionSnapshot {
        self.bus.transaction.snapshot()
    }
}

/// The instant `timeout` from now, saturating at the end of time
fn deadline_after(timeout: core::time::Duration) -> Instant {
    let timeout = u64::try_from(timeout.as_micros())
        .ok()
        .and_then(Duration::try_from_micros)
        .unwrap_or(Duration::MAX);
    Instant::now().checked_add(timeout).unwrap_or(Instant::MAX)
}

impl<R: Registers + Sync> embedded_hal_async::i2c::ErrorType for AsyncI2c<R> {
    type Error = Error;
}

/// Accepts the same operation lists as the blocking driver.
impl<R: Registers + Sync> embedded_hal_async::i2c::I2c for AsyncI2c<R> {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [embedded_hal_async::i2c::Operation<'_>],
    ) -> Result<(), Error> {
        match hal_transaction(address, operations, self.config.timeout)? {
            Some(transaction) => AsyncI2c::transaction(self, transaction).await,
            None => Ok(()),
        }
    }
}
