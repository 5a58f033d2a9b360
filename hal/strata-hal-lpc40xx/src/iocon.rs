//! I/O configuration block (IOCON)
//!
//! One 32-bit register per pin, laid out port by port, 32 pins per port.

use core::ptr::{read_volatile, write_volatile};

use strata_hal::pin::{PinControl, PinId};

/// Pin function select, bits 2:0
const FUNC_MASK: u32 = 0b111;
/// Pull-up/pull-down mode, bits 4:3 (00 = neither)
const MODE_MASK: u32 = 0b11 << 3;
/// Open-drain output
const OD: u32 = 1 << 10;

const PORT_STRIDE: usize = 0x80;
const PIN_STRIDE: usize = 0x04;

/// LPC40xx pin multiplexer
#[derive(Debug)]
pub struct Iocon {
    base: usize,
}

impl Iocon {
    /// IOCON base address on the LPC40xx
    pub const BASE: usize = 0x4002_C000;

    /// Take the chip's IOCON block
    ///
    /// # Safety
    /// Only one `Iocon` may exist at a time.
    pub const unsafe fn new() -> Self {
        Self { base: Self::BASE }
    }

    /// Use the IOCON layout at `base`
    ///
    /// # Safety
    /// `base` must point to writable, word-aligned memory covering every
    /// pin register that will be configured.
    pub const unsafe fn with_base(base: usize) -> Self {
        Self { base }
    }

    fn register(&self, pin: PinId) -> *mut u32 {
        (self.base + pin.port as usize * PORT_STRIDE + pin.pin as usize * PIN_STRIDE) as *mut u32
    }

    fn modify(&mut self, pin: PinId, f: impl FnOnce(u32) -> u32) {
        let register = self.register(pin);
        // SAFETY: `new`/`with_base` guarantee the block is mapped, and
        // `&mut self` makes this the only writer.
        unsafe { write_volatile(register, f(read_volatile(register))) }
    }
}

impl PinControl for Iocon {
    fn set_function(&mut self, pin: PinId, function: u8) {
        self.modify(pin, |v| (v & !FUNC_MASK) | (u32::from(function) & FUNC_MASK));
    }

    fn set_open_drain(&mut self, pin: PinId) {
        self.modify(pin, |v| v | OD);
    }

    fn set_floating(&mut self, pin: PinId) {
        self.modify(pin, |v| v & !MODE_MASK);
    }
}
