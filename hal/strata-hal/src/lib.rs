//! Strata Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs (LPC40xx, ...). Drivers written against these traits
//! run unchanged on every supported chip.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Drivers (strata-drivers, firmware)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  strata-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  strata-hal-  │
//!             │    lpc40xx    │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - I2C bus master transactions
//! - [`pin::PinControl`] - Pin function and electrical mode selection
//! - [`system::SystemController`] - Peripheral power and clock queries
//! - [`interrupt::InterruptController`] - Interrupt handler registration
//! - [`wait::Wait`] - Deadline-bounded waiting on a completion predicate

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod interrupt;
pub mod pin;
pub mod system;
pub mod wait;

// Re-export key traits at crate root for convenience
pub use i2c::{I2cBus, I2cConfig, Operation, Transaction};
pub use interrupt::{InterruptController, InterruptHandler, InterruptRegistration};
pub use pin::{PinControl, PinId};
pub use system::{PeripheralId, SystemController};
pub use wait::{Wait, WaitStatus};
