//! Register-mapped I2C devices
//!
//! Most I2C peripherals expose an 8-bit register address space: a write of
//! the register index followed by a repeated-start read returns its value,
//! and a write of the index followed by data updates it. Consecutive
//! registers auto-increment on the devices this targets.

use heapless::Vec;
use strata_hal::i2c::I2cBus;

/// Largest payload accepted by [`RegisterDevice::write_registers`]
pub const MAX_WRITE: usize = 32;

/// Error from a register access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterError<E> {
    /// The bus transaction failed
    Bus(E),
    /// More than [`MAX_WRITE`] bytes in one write
    PayloadTooLarge,
}

impl<E> From<E> for RegisterError<E> {
    fn from(e: E) -> Self {
        RegisterError::Bus(e)
    }
}

/// A device at a fixed address with an 8-bit register file
pub struct RegisterDevice<B> {
    bus: B,
    address: u8,
}

impl<B: I2cBus> RegisterDevice<B> {
    /// Wrap the device at 7-bit `address` on `bus`
    pub fn new(bus: B, address: u8) -> Self {
        Self { bus, address }
    }

    /// Device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the bus
    pub fn release(self) -> B {
        self.bus
    }

    /// Read one register
    pub fn read_register(&mut self, register: u8) -> Result<u8, RegisterError<B::Error>> {
        let mut value = [0u8; 1];
        self.read_registers(register, &mut value)?;
        Ok(value[0])
    }

    /// Read `buf.len()` consecutive registers starting at `register`
    pub fn read_registers(
        &mut self,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), RegisterError<B::Error>> {
        self.bus.write_read(self.address, &[register], buf)?;
        Ok(())
    }

    /// Write one register
    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), RegisterError<B::Error>> {
        self.bus.write(self.address, &[register, value])?;
        Ok(())
    }

    /// Write consecutive registers starting at `register`
    pub fn write_registers(
        &mut self,
        register: u8,
        data: &[u8],
    ) -> Result<(), RegisterError<B::Error>> {
        if data.len() > MAX_WRITE {
            return Err(RegisterError::PayloadTooLarge);
        }
        let mut frame: Vec<u8, { MAX_WRITE + 1 }> = Vec::new();
        // Both fit: 1 + data.len() <= MAX_WRITE + 1
        let _ = frame.push(register);
        let _ = frame.extend_from_slice(data);

        self.bus.write(self.address, &frame)?;
        Ok(())
    }

    /// Read a register, replace the bits in `mask` with `bits`, write it back
    ///
    /// Returns the value written. The write is skipped when nothing changes.
    pub fn update_register(
        &mut self,
        register: u8,
        mask: u8,
        bits: u8,
    ) -> Result<u8, RegisterError<B::Error>> {
        let old = self.read_register(register)?;
        let new = (old & !mask) | (bits & mask);
        if new != old {
            self.write_register(register, new)?;
        }
        Ok(new)
    }
}
