//! Error types for the LPC40xx I2C engine

use strata_hal::i2c::ErrorKind;

/// Error from an I2C transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Transaction attempted before [`I2c::initialize`](crate::I2c::initialize)
    NotReadyYet,
    /// No acknowledgment to the address byte
    DeviceNotFound,
    /// Illegal start/stop condition reported by the controller
    BusError,
    /// Deadline passed with data still outstanding; the bus was aborted
    Timeout,
    /// Operation list that does not fit one transaction; nothing was sent
    Unsupported,
}

impl strata_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::NotReadyYet => ErrorKind::NotReadyYet,
            Error::DeviceNotFound => ErrorKind::DeviceNotFound,
            Error::BusError => ErrorKind::BusError,
            Error::Timeout => ErrorKind::Timeout,
            Error::Unsupported => ErrorKind::Unsupported,
        }
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind as HalKind, NoAcknowledgeSource};

        match self {
            Error::DeviceNotFound => HalKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Error::BusError => HalKind::Bus,
            Error::NotReadyYet | Error::Timeout | Error::Unsupported => HalKind::Other,
        }
    }
}

/// Error from bus initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// The system controller could not report the peripheral clock
    ClockUnavailable,
    /// The requested bus clock cannot be derived from the peripheral clock
    InvalidClockRate,
}
