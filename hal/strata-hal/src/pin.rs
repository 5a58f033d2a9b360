//! Pin function and electrical mode selection
//!
//! Peripherals that own pins (I2C, UART, ...) configure them through
//! [`PinControl`] during initialization. Chip HALs implement it on top of
//! their pin multiplexing registers.

/// A physical pin, identified by port and pin number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId {
    /// GPIO port
    pub port: u8,
    /// Pin within the port
    pub pin: u8,
}

impl PinId {
    /// Create a pin identifier
    pub const fn new(port: u8, pin: u8) -> Self {
        Self { port, pin }
    }
}

/// Pin multiplexing and electrical configuration
pub trait PinControl {
    /// Route the pin to the alternate function `function`
    fn set_function(&mut self, pin: PinId, function: u8);

    /// Drive low only, never high (bus lines shared through a pull-up)
    fn set_open_drain(&mut self, pin: PinId);

    /// Disable internal pull resistors
    fn set_floating(&mut self, pin: PinId);
}
