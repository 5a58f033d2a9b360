//! I2C bus descriptors
//!
//! One [`Bus`] per physical controller. The LPC40xx has three, defined here
//! as statics with their register blocks, power bits, IRQ numbers and default
//! pin assignments (UM10562 chapter 7). Each descriptor points at its own
//! [`TransactionCell`]; a bus carries at most one transaction at a time.

use strata_hal::interrupt::{
    InterruptController, InterruptHandler, InterruptRegistration, IrqNumber,
};
use strata_hal::pin::{PinControl, PinId};
use strata_hal::system::{PeripheralId, SystemController};

use crate::clock::ClockDuty;
use crate::error::InitError;
use crate::handler;
use crate::registers::{Control, Lpc40xxRegisters, Registers};
use crate::transaction::TransactionCell;

/// Static description of one I2C controller
#[derive(Debug)]
pub struct Bus<R: 'static = Lpc40xxRegisters> {
    /// Register block
    pub registers: R,
    /// Power/clock resource
    pub peripheral: PeripheralId,
    /// Status interrupt line
    pub irq: IrqNumber,
    /// The bus's transaction record
    pub transaction: &'static TransactionCell,
    /// Data line
    pub sda: PinId,
    /// Clock line
    pub scl: PinId,
    /// Alternate function selecting I2C on both pins
    pub pin_function: u8,
}

impl<R: Registers + Sync> Bus<R> {
    /// Bring the controller up at `clock_rate_hz`
    ///
    /// Configures both pins as open-drain and floating (the bus has external
    /// pull-ups), powers the block, derives the SCL duty registers from the
    /// measured peripheral clock, resets the control flags, enables the
    /// interface and installs the status interrupt handler.
    pub fn initialize<P, S, I>(
        &'static self,
        clock_rate_hz: u32,
        pins: &mut P,
        system: &mut S,
        interrupts: &mut I,
    ) -> Result<(), InitError>
    where
        P: PinControl + ?Sized,
        S: SystemController + ?Sized,
        I: InterruptController + ?Sized,
    {
        for pin in [self.sda, self.scl] {
            pins.set_function(pin, self.pin_function);
            pins.set_open_drain(pin);
            pins.set_floating(pin);
        }

        system.power_up(self.peripheral);
        let peripheral_hz = system
            .clock_rate(self.peripheral)
            .ok_or(InitError::ClockUnavailable)?;
        let duty = ClockDuty::from_rates(peripheral_hz, clock_rate_hz)?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "I2C irq {}: {} Hz from {} Hz (SCLH={}, SCLL={})",
            self.irq,
            clock_rate_hz,
            peripheral_hz,
            duty.high,
            duty.low
        );

        self.registers.set_clock_duty(duty);
        self.registers.clear_control(
            Control::ASSERT_ACK | Control::START | Control::STOP | Control::INTERRUPT,
        );
        self.registers.set_control(Control::INTERFACE_ENABLE);

        interrupts.enable(InterruptRegistration {
            irq: self.irq,
            handler: self,
        });

        self.transaction.mark_initialized();
        Ok(())
    }

    /// Check whether [`Bus::initialize`] has run
    pub fn is_initialized(&self) -> bool {
        self.transaction.is_initialized()
    }
}

impl<R: Registers + Sync> InterruptHandler for Bus<R> {
    fn on_interrupt(&self) {
        handler::service(&self.registers, self.transaction);
    }
}

static TRANSACTION_I2C0: TransactionCell = TransactionCell::new();
static TRANSACTION_I2C1: TransactionCell = TransactionCell::new();
static TRANSACTION_I2C2: TransactionCell = TransactionCell::new();

/// I2C0 on P0.0 (SDA) / P0.1 (SCL)
pub static I2C0: Bus = Bus {
    // SAFETY: LPC40xx I2C0 register block, wrapped only here
    registers: unsafe { Lpc40xxRegisters::new(0x4001_C000) },
    peripheral: PeripheralId(7),
    irq: 10,
    transaction: &TRANSACTION_I2C0,
    sda: PinId::new(0, 0),
    scl: PinId::new(0, 1),
    pin_function: 0b010,
};

/// I2C1 on P1.30 (SDA) / P1.31 (SCL)
pub static I2C1: Bus = Bus {
    // SAFETY: LPC40xx I2C1 register block, wrapped only here
    registers: unsafe { Lpc40xxRegisters::new(0x4005_C000) },
    peripheral: PeripheralId(19),
    irq: 11,
    transaction: &TRANSACTION_I2C1,
    sda: PinId::new(1, 30),
    scl: PinId::new(1, 31),
    pin_function: 0b011,
};

/// I2C2 on P0.10 (SDA) / P0.11 (SCL)
pub static I2C2: Bus = Bus {
    // SAFETY: LPC40xx I2C2 register block, wrapped only here
    registers: unsafe { Lpc40xxRegisters::new(0x400A_0000) },
    peripheral: PeripheralId(26),
    irq: 12,
    transaction: &TRANSACTION_I2C2,
    sda: PinId::new(0, 10),
    scl: PinId::new(0, 11),
    pin_function: 0b010,
};
