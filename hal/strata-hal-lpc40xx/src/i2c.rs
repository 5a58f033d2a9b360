//! Blocking I2C master driver
//!
//! Issues one transaction at a time on a [`Bus`] and blocks in a [`Wait`]
//! strategy until the interrupt handler hands the record back or the
//! transaction's timeout expires.
//!
//! ```ignore
//! let mut i2c = I2c::new(&I2C2, I2cConfig::FAST, DelayWait::new(delay));
//! i2c.initialize(&mut iocon, &mut syscon, &mut nvic)?;
//!
//! let mut id = [0u8; 1];
//! i2c.write_read(0x1C, &[0x0D], &mut id)?;
//! ```

use core::marker::PhantomData;

use strata_hal::i2c::{I2cBus, I2cConfig, Transaction};
use strata_hal::interrupt::InterruptController;
use strata_hal::pin::PinControl;
use strata_hal::system::SystemController;
use strata_hal::wait::{Wait, WaitStatus};

use crate::bus::Bus;
use crate::error::{Error, InitError};
use crate::registers::{Control, Lpc40xxRegisters, Registers};
use crate::transaction::{Status, TransactionSnapshot};

/// A transaction handed to the interrupt handler
///
/// Holds the caller's buffers borrowed for as long as the handler may touch
/// them. Dropping the guard takes the record back, aborts the bus if the
/// handler still owned it and withdraws the start request, so an early
/// return or unwind never leaves the record pointing at a dead buffer.
pub(crate) struct ActiveTransaction<'t, R: Registers + 'static> {
    bus: &'t Bus<R>,
    _buffers: PhantomData<&'t mut ()>,
}

impl<'t, R: Registers + 'static> ActiveTransaction<'t, R> {
    /// Load `transaction` into the bus's record and request a start
    pub(crate) fn begin(bus: &'t Bus<R>, transaction: &'t mut Transaction<'_>) -> Result<Self, Error> {
        if !bus.transaction.is_initialized() {
            return Err(Error::NotReadyYet);
        }

        // Nothing stale from the previous transaction may reach the wire
        bus.registers
            .clear_control(Control::ASSERT_ACK | Control::START);
        bus.transaction.load(transaction);
        bus.registers.set_control(Control::START);

        Ok(Self {
            bus,
            _buffers: PhantomData,
        })
    }

    /// Take the record back and turn its outcome into a result
    pub(crate) fn conclude(self, wait: WaitStatus) -> Result<(), Error> {
        let outcome = self.bus.transaction.finish();
        let timed_out = wait == WaitStatus::TimedOut && outcome.was_busy;

        match outcome.status {
            Status::BusError => Err(Error::BusError),
            Status::DeviceNotFound => Err(Error::DeviceNotFound),
            _ if timed_out => {
                self.abort();
                // An address-only probe that nobody finished is not an error
                if outcome.out_length > 0 || outcome.in_length > 0 {
                    Err(Error::Timeout)
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// NACK whatever comes next and release the bus
    fn abort(&self) {
        self.bus.registers.clear_control(Control::ASSERT_ACK);
        self.bus.registers.set_control(Control::STOP);
    }
}

impl<R: Registers + 'static> Drop for ActiveTransaction<'_, R> {
    fn drop(&mut self) {
        if self.bus.transaction.finish().was_busy {
            self.abort();
        }
        self.bus.registers.clear_control(Control::START);
    }
}

/// Interrupt-driven I2C master
pub struct I2c<W, R: 'static = Lpc40xxRegisters> {
    bus: &'static Bus<R>,
    config: I2cConfig,
    wait: W,
}

impl<W: Wait, R: Registers + Sync> I2c<W, R> {
    /// Create a driver for `bus`
    ///
    /// The bus must be brought up with [`I2c::initialize`] (or
    /// [`Bus::initialize`]) before the first transaction.
    pub fn new(bus: &'static Bus<R>, config: I2cConfig, wait: W) -> Self {
        Self { bus, config, wait }
    }

    /// Bring the bus up at the configured frequency
    pub fn initialize<P, S, I>(
        &mut self,
        pins: &mut P,
        system: &mut S,
        interrupts: &mut I,
    ) -> Result<(), InitError>
    where
        P: PinControl + ?Sized,
        S: SystemController + ?Sized,
        I: InterruptController + ?Sized,
    {
        self.bus
            .initialize(self.config.frequency, pins, system, interrupts)
    }

    /// Run `transaction` to completion
    ///
    /// Blocks until the handler releases the record or `transaction.timeout`
    /// passes. On timeout the bus is aborted with a NACK and a stop; the
    /// call reports [`Error::Timeout`] only if the transaction had data to
    /// move.
    ///
    /// # Panics
    /// If another transaction is still in flight on the same bus.
    pub fn transaction(&mut self, transaction: Transaction<'_>) -> Result<(), Error> {
        self.execute(transaction)
    }

    /// Write `data` to the device at `address`
    pub fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
        self.execute(Transaction::write(address, data, self.config.timeout))
    }

    /// Fill `buf` from the device at `address`
    pub fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Error> {
        self.execute(Transaction::read(address, buf, self.config.timeout))
    }

    /// Write `data`, then read into `buf` after a repeated start
    pub fn write_read(&mut self, address: u8, data: &[u8], buf: &mut [u8]) -> Result<(), Error> {
        self.execute(Transaction::write_read(
            address,
            data,
            buf,
            self.config.timeout,
        ))
    }

    /// Check whether a device acknowledges `address`
    pub fn probe(&mut self, address: u8) -> Result<(), Error> {
        self.execute(Transaction::probe(address, self.config.timeout))
    }

    /// State of the last transaction on this bus
    pub fn transaction_info(&self) -> TransactionSnapshot {
        self.bus.transaction.snapshot()
    }

    /// Check whether the bus has been initialized
    pub fn is_initialized(&self) -> bool {
        self.bus.is_initialized()
    }

    /// Driver configuration
    pub fn config(&self) -> &I2cConfig {
        &self.config
    }

    /// The bus this driver runs on
    pub fn bus(&self) -> &'static Bus<R> {
        self.bus
    }

    fn execute(&mut self, mut transaction: Transaction<'_>) -> Result<(), Error> {
        let timeout = transaction.timeout;
        #[cfg(feature = "defmt")]
        let address = transaction.address;

        let active = ActiveTransaction::begin(self.bus, &mut transaction)?;
        let cell = self.bus.transaction;
        let wait = self.wait.wait(timeout, &mut || !cell.is_busy());
        let result = active.conclude(wait);

        #[cfg(feature = "defmt")]
        if let Err(e) = result {
            defmt::debug!("I2C {=u8:#x}: {}", address, e);
        }

        result
    }
}

impl<W: Wait, R: Registers + Sync> I2cBus for I2c<W, R> {
    type Error = Error;

    fn transaction(&mut self, transaction: Transaction<'_>) -> Result<(), Error> {
        self.execute(transaction)
    }

    fn timeout(&self) -> core::time::Duration {
        self.config.timeout
    }
}

impl<W: Wait, R: Registers + Sync> embedded_hal::i2c::ErrorType for I2c<W, R> {
    type Error = Error;
}

impl<W: Wait, R: Registers + Sync> embedded_hal::i2c::I2c for I2c<W, R> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [embedded_hal::i2c::Operation<'_>],
    ) -> Result<(), Error> {
        match hal_transaction(address, operations, self.config.timeout)? {
            Some(transaction) => self.execute(transaction),
            None => Ok(()),
        }
    }
}

/// Map an embedded-hal operation list onto one transaction
///
/// The record has three shapes: a lone write, a lone read, and
/// write-then-read with a repeated start. Any other list would need
/// consecutive same-direction operations on the wire without a new start,
/// so it is refused with [`Error::Unsupported`] before the bus is touched.
/// An empty list needs no transaction.
pub(crate) fn hal_transaction<'a>(
    address: u8,
    operations: &'a mut [embedded_hal::i2c::Operation<'_>],
    timeout: core::time::Duration,
) -> Result<Option<Transaction<'a>>, Error> {
    use embedded_hal::i2c::Operation as HalOperation;

    let transaction = match operations {
        [] => return Ok(None),
        [HalOperation::Write(out)] => Transaction::write(address, out, timeout),
        [HalOperation::Read(buf)] => Transaction::read(address, buf, timeout),
        [HalOperation::Write(out), HalOperation::Read(buf)] => {
            Transaction::write_read(address, out, buf, timeout)
        }
        _ => return Err(Error::Unsupported),
    };
    Ok(Some(transaction))
}
