//! Host-side I2C controller and slave simulation
//!
//! [`SimRegisters`] mimics the register block: CONSET/CONCLR write-1
//! semantics, STAT, DAT and the duty registers. [`Simulator`] plays the
//! hardware and the devices on the wire, raising one status interrupt per
//! step and calling the bus's handler, and implements [`Wait`] so the
//! blocking driver advances the bus while it waits.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};
use core::time::Duration;

use strata_hal::interrupt::InterruptHandler;
use strata_hal::pin::PinId;
use strata_hal::system::PeripheralId;
use strata_hal::wait::{Wait, WaitStatus};

use crate::bus::Bus;
use crate::clock::ClockDuty;
use crate::registers::{Control, MasterState, Registers};
use crate::transaction::TransactionCell;

/// Simulated I2C register block
#[derive(Debug)]
pub struct SimRegisters {
    control: AtomicU32,
    status: AtomicU32,
    data: AtomicU8,
    scl_high: AtomicU32,
    scl_low: AtomicU32,
    stops: AtomicUsize,
    touched: AtomicBool,
}

impl SimRegisters {
    pub const fn new() -> Self {
        Self {
            control: AtomicU32::new(0),
            status: AtomicU32::new(MasterState::Idle.code()),
            data: AtomicU8::new(0),
            scl_high: AtomicU32::new(0),
            scl_low: AtomicU32::new(0),
            stops: AtomicUsize::new(0),
            touched: AtomicBool::new(false),
        }
    }

    /// Hardware side: report `code` and flag the interrupt
    pub fn raise(&self, code: u32) {
        self.status.store(code, Ordering::SeqCst);
        self.control
            .fetch_or(Control::INTERRUPT.bits(), Ordering::SeqCst);
    }

    /// Hardware side: latch a received byte into DAT
    pub fn receive(&self, byte: u8) {
        self.data.store(byte, Ordering::SeqCst);
    }

    /// Hardware side: self-clearing control bits
    pub fn hardware_clear(&self, flags: Control) {
        self.control.fetch_and(!flags.bits(), Ordering::SeqCst);
    }

    /// Number of times software requested a stop
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Whether software wrote any register
    pub fn touched(&self) -> bool {
        self.touched.load(Ordering::SeqCst)
    }

    pub fn duty(&self) -> ClockDuty {
        ClockDuty {
            high: self.scl_high.load(Ordering::SeqCst),
            low: self.scl_low.load(Ordering::SeqCst),
        }
    }

    fn touch(&self) {
        self.touched.store(true, Ordering::SeqCst);
    }
}

impl Registers for SimRegisters {
    fn status(&self) -> u32 {
        self.status.load(Ordering::SeqCst)
    }

    fn data(&self) -> u8 {
        self.data.load(Ordering::SeqCst)
    }

    fn write_data(&self, byte: u8) {
        self.touch();
        self.data.store(byte, Ordering::SeqCst);
    }

    fn control(&self) -> Control {
        Control::from_bits_truncate(self.control.load(Ordering::SeqCst))
    }

    fn set_control(&self, flags: Control) {
        self.touch();
        if flags.contains(Control::STOP) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
        self.control.fetch_or(flags.bits(), Ordering::SeqCst);
    }

    fn clear_control(&self, flags: Control) {
        self.touch();
        self.control.fetch_and(!flags.bits(), Ordering::SeqCst);
    }

    fn set_clock_duty(&self, duty: ClockDuty) {
        self.touch();
        self.scl_high.store(duty.high, Ordering::SeqCst);
        self.scl_low.store(duty.low, Ordering::SeqCst);
    }
}

/// A bus descriptor over simulated registers, leaked for `'static`
pub fn leak_bus() -> &'static Bus<SimRegisters> {
    let cell: &'static TransactionCell = Box::leak(Box::new(TransactionCell::new()));
    Box::leak(Box::new(Bus {
        registers: SimRegisters::new(),
        peripheral: PeripheralId(7),
        irq: 10,
        transaction: cell,
        sda: PinId::new(0, 0),
        scl: PinId::new(0, 1),
        pin_function: 0b010,
    }))
}

/// What appeared on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEvent {
    Start,
    RepeatedStart,
    Address(u8),
    Write(u8),
    Read { byte: u8, acked: bool },
    Stop,
}

/// A slave device on the simulated bus
#[derive(Debug, Default)]
pub struct Device {
    pub address: u8,
    /// NACK the n-th data byte written (1-based)
    pub nack_write: Option<usize>,
    /// Bytes returned to reads, repeated from the start when exhausted
    pub respond: Vec<u8>,
    pub received: Vec<u8>,
    sent: usize,
}

impl Device {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    pub fn responding(mut self, bytes: &[u8]) -> Self {
        self.respond = bytes.to_vec();
        self
    }

    pub fn nacking_write(mut self, n: usize) -> Self {
        self.nack_write = Some(n);
        self
    }

    fn next_byte(&mut self) -> u8 {
        if self.respond.is_empty() {
            return 0xFF;
        }
        let byte = self.respond[self.sent % self.respond.len()];
        self.sent += 1;
        byte
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Addressing,
    Transmitting,
    Receiving,
}

/// Controller hardware plus the devices attached to it
pub struct Simulator {
    bus: &'static Bus<SimRegisters>,
    phase: Phase,
    active: Option<usize>,
    pub devices: Vec<Device>,
    pub events: Vec<WireEvent>,
    /// Stop responding entirely (clock stretched forever, no device)
    pub silent: bool,
    /// Lose arbitration this many times before winning the bus
    pub arbitration_losses: usize,
    /// Report a bus error instead of the n-th interrupt (1-based)
    pub bus_error_at: Option<usize>,
    pub interrupts: usize,
    pub waits: usize,
}

impl Simulator {
    pub fn new(bus: &'static Bus<SimRegisters>) -> Self {
        Self {
            bus,
            phase: Phase::Idle,
            active: None,
            devices: Vec::new(),
            events: Vec::new(),
            silent: false,
            arbitration_losses: 0,
            bus_error_at: None,
            interrupts: 0,
            waits: 0,
        }
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.devices.push(device);
        self
    }

    pub fn device(&self, address: u8) -> &Device {
        self.devices
            .iter()
            .find(|d| d.address == address)
            .expect("no such device")
    }

    pub fn count(&self, event: WireEvent) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }

    /// Advance the bus by one status change
    ///
    /// Returns false when the hardware has nothing to report.
    pub fn step(&mut self) -> bool {
        let bus = self.bus;
        let regs = &bus.registers;
        let control = regs.control();

        if control.contains(Control::STOP) {
            regs.hardware_clear(Control::STOP);
            self.events.push(WireEvent::Stop);
            self.phase = Phase::Idle;
        }

        if self.silent {
            return false;
        }

        let state = match self.phase {
            Phase::Idle => {
                if !control.contains(Control::START) {
                    return false;
                }
                if self.arbitration_losses > 0 {
                    self.arbitration_losses -= 1;
                    MasterState::ArbitrationLost
                } else {
                    self.events.push(WireEvent::Start);
                    self.phase = Phase::Addressing;
                    MasterState::StartCondition
                }
            }
            Phase::Addressing => {
                let byte = regs.data();
                self.events.push(WireEvent::Address(byte));
                let read = byte & 1 == 1;
                self.active = self.devices.iter().position(|d| d.address == byte >> 1);
                match (self.active.is_some(), read) {
                    (true, false) => {
                        self.phase = Phase::Transmitting;
                        MasterState::AddressWriteAck
                    }
                    (true, true) => {
                        self.phase = Phase::Receiving;
                        MasterState::AddressReadAck
                    }
                    (false, false) => MasterState::AddressWriteNack,
                    (false, true) => MasterState::AddressReadNack,
                }
            }
            Phase::Transmitting => {
                if control.contains(Control::START) {
                    self.events.push(WireEvent::RepeatedStart);
                    self.phase = Phase::Addressing;
                    MasterState::RepeatedStart
                } else {
                    let byte = regs.data();
                    self.events.push(WireEvent::Write(byte));
                    let device = &mut self.devices[self.active.expect("no active device")];
                    device.received.push(byte);
                    match device.nack_write {
                        Some(n) if device.received.len() >= n => MasterState::DataWriteNack,
                        _ => MasterState::DataWriteAck,
                    }
                }
            }
            Phase::Receiving => {
                let acked = control.contains(Control::ASSERT_ACK);
                let device = &mut self.devices[self.active.expect("no active device")];
                let byte = device.next_byte();
                regs.receive(byte);
                self.events.push(WireEvent::Read { byte, acked });
                if acked {
                    MasterState::DataReadAck
                } else {
                    MasterState::DataReadNack
                }
            }
        };

        self.interrupts += 1;
        let state = if self.bus_error_at == Some(self.interrupts) {
            MasterState::BusError
        } else {
            state
        };

        regs.raise(state.code());
        bus.on_interrupt();
        true
    }
}

impl Wait for Simulator {
    fn wait(&mut self, _timeout: Duration, done: &mut dyn FnMut() -> bool) -> WaitStatus {
        self.waits += 1;
        loop {
            if done() {
                return WaitStatus::Completed;
            }
            if !self.step() {
                // Nothing more will happen on the wire: the deadline runs out
                return if done() {
                    WaitStatus::Completed
                } else {
                    WaitStatus::TimedOut
                };
            }
        }
    }
}
