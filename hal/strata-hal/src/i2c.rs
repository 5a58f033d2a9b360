//! I2C bus abstractions
//!
//! Provides the transaction description shared by every I2C master
//! implementation, plus a trait for issuing transactions that chip-specific
//! HALs implement.

use core::fmt::Debug;
use core::time::Duration;

/// Default bound on how long a single transaction may take
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// Direction of the current phase of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// Master transmits to the device
    Write,
    /// Master receives from the device
    Read,
}

/// One complete bus transaction
///
/// A transaction with `repeated` set writes `data_out`, then issues a
/// repeated start and reads into `data_in` without releasing the bus.
#[derive(Debug)]
pub struct Transaction<'a> {
    /// 7-bit device address
    pub address: u8,
    /// Direction of the first phase
    pub operation: Operation,
    /// Bytes to transmit
    pub data_out: &'a [u8],
    /// Buffer to fill with received bytes
    pub data_in: &'a mut [u8],
    /// Switch to a read phase with a repeated start once `data_out` is sent
    pub repeated: bool,
    /// Bound on the whole transaction
    pub timeout: Duration,
}

impl<'a> Transaction<'a> {
    /// Write `data` to the device at `address`
    pub fn write(address: u8, data: &'a [u8], timeout: Duration) -> Self {
        Self {
            address,
            operation: Operation::Write,
            data_out: data,
            data_in: &mut [],
            repeated: false,
            timeout,
        }
    }

    /// Fill `buf` from the device at `address`
    pub fn read(address: u8, buf: &'a mut [u8], timeout: Duration) -> Self {
        Self {
            address,
            operation: Operation::Read,
            data_out: &[],
            data_in: buf,
            repeated: false,
            timeout,
        }
    }

    /// Write `data`, then read into `buf` after a repeated start
    ///
    /// With nothing to write this is a plain [`Transaction::read`].
    pub fn write_read(address: u8, data: &'a [u8], buf: &'a mut [u8], timeout: Duration) -> Self {
        if data.is_empty() {
            return Self::read(address, buf, timeout);
        }
        Self {
            address,
            operation: Operation::Write,
            data_out: data,
            data_in: buf,
            repeated: true,
            timeout,
        }
    }

    /// Address-only transaction, used to check whether a device answers
    pub fn probe(address: u8, timeout: Duration) -> Self {
        Self::write(address, &[], timeout)
    }
}

/// The byte placed on the bus after a start condition
///
/// Address in bits 7:1, read flag in bit 0.
#[inline]
pub const fn address_byte(address: u8, operation: Operation) -> u8 {
    let rw = match operation {
        Operation::Write => 0,
        Operation::Read => 1,
    };
    ((address & 0x7F) << 1) | rw
}

/// Classification of a bus failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Bus used before it was initialized
    NotReadyYet,
    /// The addressed device did not acknowledge
    DeviceNotFound,
    /// Illegal electrical condition on the bus
    BusError,
    /// Deadline passed with data still outstanding
    Timeout,
    /// Request the bus master cannot express as one transaction
    Unsupported,
}

/// Error type of an [`I2cBus`] implementation
pub trait Error: Debug {
    /// Classify this error
    fn kind(&self) -> ErrorKind;
}

impl Error for ErrorKind {
    fn kind(&self) -> ErrorKind {
        *self
    }
}

/// I2C bus master
///
/// Implementations run one transaction at a time. Convenience methods are
/// layered on [`I2cBus::transaction`] using [`I2cBus::timeout`].
pub trait I2cBus {
    /// Error type for I2C operations
    type Error: Error;

    /// Run a complete transaction, blocking until it finishes or times out
    fn transaction(&mut self, transaction: Transaction<'_>) -> Result<(), Self::Error>;

    /// Timeout used by the convenience methods
    fn timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        let timeout = self.timeout();
        self.transaction(Transaction::write(address, data, timeout))
    }

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        let timeout = self.timeout();
        self.transaction(Transaction::read(address, buf, timeout))
    }

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        let timeout = self.timeout();
        self.transaction(Transaction::write_read(address, write_data, read_buf, timeout))
    }

    /// Check whether a device acknowledges `address`
    fn probe(&mut self, address: u8) -> Result<(), Self::Error> {
        let timeout = self.timeout();
        self.transaction(Transaction::probe(address, timeout))
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Bound on each transaction issued through the convenience methods
    pub timeout: Duration,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        frequency: 100_000,
        timeout: DEFAULT_TIMEOUT,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        frequency: 400_000,
        timeout: DEFAULT_TIMEOUT,
    };

    /// Fast mode plus (1 MHz)
    pub const FAST_PLUS: Self = Self {
        frequency: 1_000_000,
        timeout: DEFAULT_TIMEOUT,
    };

    /// Same configuration with a different transaction timeout
    pub const fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            frequency: self.frequency,
            timeout,
        }
    }
}
