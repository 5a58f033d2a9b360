//! Device drivers
//!
//! Drivers in this crate talk to hardware only through the `strata-hal`
//! traits, so they run on every chip with a HAL and test on the host
//! against mock buses.
//!
//! - I2C bus scanner
//! - Register-mapped I2C devices (sensors, EEPROM-style configuration)

#![no_std]
#![deny(unsafe_code)]

pub mod register;
pub mod scanner;
