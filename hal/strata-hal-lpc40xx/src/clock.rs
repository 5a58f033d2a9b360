//! SCL duty cycle computation
//!
//! The high phase is stretched to 130% and the low phase shortened to 70%
//! of a symmetric half period, giving the open-drain lines more time to rise
//! through the pull-ups. Integer math only; small cores have no FPU.

use crate::error::InitError;

/// Smallest value SCLH and SCLL accept (UM10562 I2SCLH/I2SCLL)
pub const MIN_DUTY: u32 = 4;

/// SCLH / SCLL register values, in peripheral clock cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockDuty {
    /// SCL high time
    pub high: u32,
    /// SCL low time
    pub low: u32,
}

impl ClockDuty {
    /// Compute the duty registers for a bus clock of `bus_hz`
    ///
    /// With `base = peripheral_hz / (2 * bus_hz)`, high is `1.3 * base` and
    /// low is `0.7 * base`, both truncated. Rates that leave either phase
    /// below [`MIN_DUTY`] cycles are rejected.
    pub fn from_rates(peripheral_hz: u32, bus_hz: u32) -> Result<Self, InitError> {
        if bus_hz == 0 {
            return Err(InitError::InvalidClockRate);
        }

        let numerator = peripheral_hz as u64;
        let denominator = 20 * bus_hz as u64;
        let high = numerator * 13 / denominator;
        let low = numerator * 7 / denominator;

        if low < MIN_DUTY as u64 {
            return Err(InitError::InvalidClockRate);
        }

        Ok(Self {
            high: high.min(u32::MAX as u64) as u32,
            low: low.min(u32::MAX as u64) as u32,
        })
    }
}
