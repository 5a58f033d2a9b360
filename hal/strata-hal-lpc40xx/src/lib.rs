//! LPC40xx-specific HAL for Strata firmware
//!
//! Interrupt-driven I2C bus master for the three LPC40xx I2C controllers,
//! plus the IOCON pin multiplexer it needs during bring-up.
//!
//! # Layout
//!
//! - [`bus`] - static descriptors [`I2C0`], [`I2C1`], [`I2C2`] and bus
//!   initialization
//! - [`handler`] - the status-code state machine run from the I2C interrupt
//! - [`i2c`] - blocking driver with a timeout-bounded wait
//! - `asynch` - async driver (feature `async`)
//! - [`transaction`] - the per-bus transaction record shared by both sides
//!
//! # Features
//!
//! - `defmt` - Enable debug formatting support and bring-up/error logging
//! - `async` - `AsyncI2c`, built on `embassy-time` and `embedded-hal-async`

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod clock;
pub mod error;
pub mod handler;
pub mod i2c;
pub mod iocon;
pub mod registers;
pub mod transaction;
pub mod wait;

#[cfg(feature = "async")]
pub mod asynch;

#[cfg(test)]
mod sim;

pub use bus::{Bus, I2C0, I2C1, I2C2};
pub use clock::ClockDuty;
pub use error::{Error, InitError};
pub use i2c::I2c;
pub use iocon::Iocon;
pub use registers::{Control, Lpc40xxRegisters, MasterState, Registers};
pub use transaction::{Status, TransactionCell, TransactionSnapshot};
pub use wait::DelayWait;

#[cfg(feature = "async")]
pub use asynch::AsyncI2c;

// Re-export shared types from strata-hal
pub use strata_hal::i2c::{I2cBus, I2cConfig, Operation, Transaction};
