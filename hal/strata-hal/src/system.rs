//! Peripheral power and clock management
//!
//! The clock tree itself lives with the chip HAL; peripheral drivers only
//! need to power their block and learn the frequency it actually runs at.

/// Peripheral power/clock resource identifier
///
/// For chips with a single power-control register this is the bit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeripheralId(pub u8);

/// System (power and clock) controller
pub trait SystemController {
    /// Enable power and clock for the peripheral
    fn power_up(&mut self, id: PeripheralId);

    /// Check whether the peripheral is powered
    fn is_powered_up(&self, id: PeripheralId) -> bool;

    /// Clock frequency feeding the peripheral in Hz
    ///
    /// Returns `None` if the rate cannot be determined.
    fn clock_rate(&self, id: PeripheralId) -> Option<u32>;
}
