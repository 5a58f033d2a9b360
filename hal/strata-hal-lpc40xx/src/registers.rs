//! LPC40xx I2C register block
//!
//! The control register is split across two addresses: writing a 1 to a bit
//! of CONSET sets it, writing a 1 to the same bit of CONCLR clears it. Bits
//! written as 0 are left alone, so set and clear masks never interfere.
//!
//! See UM10562 chapter 21 for the register layout and status codes.

use bitflags::bitflags;
use core::ptr::{read_volatile, write_volatile};

use crate::clock::ClockDuty;

/// Register offsets from the block base
mod offset {
    pub const CONSET: usize = 0x00;
    pub const STAT: usize = 0x04;
    pub const DAT: usize = 0x08;
    pub const SCLH: usize = 0x10;
    pub const SCLL: usize = 0x14;
    pub const CONCLR: usize = 0x18;
}

bitflags! {
    /// I2C control register flags (CONSET / CONCLR)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Control: u32 {
        /// AA: acknowledge the next received byte
        const ASSERT_ACK = 1 << 2;
        /// SI: status change pending; the bus is held until cleared
        const INTERRUPT = 1 << 3;
        /// STO: transmit a stop condition
        const STOP = 1 << 4;
        /// STA: transmit a (repeated) start condition
        const START = 1 << 5;
        /// I2EN: interface enable
        const INTERFACE_ENABLE = 1 << 6;
    }
}

/// Master-mode status codes reported in STAT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MasterState {
    /// Illegal start or stop detected on the bus
    BusError,
    /// Start transmitted
    StartCondition,
    /// Repeated start transmitted
    RepeatedStart,
    /// Address+W transmitted, ACK received
    AddressWriteAck,
    /// Address+W transmitted, NACK received
    AddressWriteNack,
    /// Data byte transmitted, ACK received
    DataWriteAck,
    /// Data byte transmitted, NACK received
    DataWriteNack,
    /// Lost arbitration to another master
    ArbitrationLost,
    /// Address+R transmitted, ACK received
    AddressReadAck,
    /// Address+R transmitted, NACK received
    AddressReadNack,
    /// Data byte received, ACK returned
    DataReadAck,
    /// Data byte received, NACK returned
    DataReadNack,
    /// Own slave address received
    OwnAddressReceived,
    /// No relevant state information
    Idle,
}

impl MasterState {
    /// Decode a STAT value
    ///
    /// Returns `None` for codes the master engine does not handle.
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0x00 => Self::BusError,
            0x08 => Self::StartCondition,
            0x10 => Self::RepeatedStart,
            0x18 => Self::AddressWriteAck,
            0x20 => Self::AddressWriteNack,
            0x28 => Self::DataWriteAck,
            0x30 => Self::DataWriteNack,
            0x38 => Self::ArbitrationLost,
            0x40 => Self::AddressReadAck,
            0x48 => Self::AddressReadNack,
            0x50 => Self::DataReadAck,
            0x58 => Self::DataReadNack,
            0xA0 => Self::OwnAddressReceived,
            0xF8 => Self::Idle,
            _ => return None,
        })
    }

    /// The STAT value for this state
    pub const fn code(self) -> u32 {
        match self {
            Self::BusError => 0x00,
            Self::StartCondition => 0x08,
            Self::RepeatedStart => 0x10,
            Self::AddressWriteAck => 0x18,
            Self::AddressWriteNack => 0x20,
            Self::DataWriteAck => 0x28,
            Self::DataWriteNack => 0x30,
            Self::ArbitrationLost => 0x38,
            Self::AddressReadAck => 0x40,
            Self::AddressReadNack => 0x48,
            Self::DataReadAck => 0x50,
            Self::DataReadNack => 0x58,
            Self::OwnAddressReceived => 0xA0,
            Self::Idle => 0xF8,
        }
    }
}

/// Access to one I2C register block
///
/// Methods take `&self`: the block is shared between the interrupt handler
/// and foreground code, and every access is a single register read or write.
pub trait Registers {
    /// Read STAT
    fn status(&self) -> u32;

    /// Read DAT
    fn data(&self) -> u8;

    /// Write DAT
    fn write_data(&self, byte: u8);

    /// Read the current control flags
    fn control(&self) -> Control;

    /// Write `flags` to CONSET
    fn set_control(&self, flags: Control);

    /// Write `flags` to CONCLR
    fn clear_control(&self, flags: Control);

    /// Write SCLH and SCLL
    fn set_clock_duty(&self, duty: ClockDuty);
}

/// Memory-mapped LPC40xx I2C register block
#[derive(Debug)]
pub struct Lpc40xxRegisters {
    base: usize,
}

impl Lpc40xxRegisters {
    /// Wrap the register block at `base`
    ///
    /// # Safety
    /// `base` must be the address of an LPC40xx I2C peripheral, and only one
    /// bus descriptor may wrap it.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the block
    pub const fn base(&self) -> usize {
        self.base
    }

    #[inline]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: `new` requires `base` to be a valid I2C block, and every
        // offset used is a word-aligned register within it.
        unsafe { read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    fn write(&self, offset: usize, value: u32) {
        // SAFETY: as for `read`.
        unsafe { write_volatile((self.base + offset) as *mut u32, value) }
    }
}

impl Registers for Lpc40xxRegisters {
    fn status(&self) -> u32 {
        self.read(offset::STAT)
    }

    fn data(&self) -> u8 {
        self.read(offset::DAT) as u8
    }

    fn write_data(&self, byte: u8) {
        self.write(offset::DAT, byte as u32);
    }

    fn control(&self) -> Control {
        Control::from_bits_truncate(self.read(offset::CONSET))
    }

    fn set_control(&self, flags: Control) {
        self.write(offset::CONSET, flags.bits());
    }

    fn clear_control(&self, flags: Control) {
        self.write(offset::CONCLR, flags.bits());
    }

    fn set_clock_duty(&self, duty: ClockDuty) {
        self.write(offset::SCLH, duty.high);
        self.write(offset::SCLL, duty.low);
    }
}
