//! I2C master state machine
//!
//! Runs once per status interrupt. Each status code maps to a record update
//! plus a pair of control masks: `set` is written to CONSET and `clear` to
//! CONCLR. SI is always cleared last, which releases the bus to perform the
//! action just programmed.
//!
//! | Status | Record | Control |
//! |---|---|---|
//! | Bus error | BusError, done | set AA+STO |
//! | Start | - | DAT = address |
//! | Repeated start | read phase | DAT = address+R |
//! | Address+W ACK | send first byte, or Success if nothing to send | clear STA (set STO if done) |
//! | Address+W NACK | DeviceNotFound, done | clear STA, set STO |
//! | Data ACK | send next byte, or repeated start, or Success | STA or STO when out of bytes |
//! | Data NACK | done | set STO |
//! | Arbitration lost | - | set STA (retry) |
//! | Address+R ACK | - | clear STA; STO if nothing to read, AA unless one byte |
//! | Address+R NACK | DeviceNotFound, done | clear STA, set STO |
//! | Data received, ACK sent | store byte | AA off before the final byte |
//! | Data received, NACK sent | store final byte, Success | set STO |
//! | Own address / idle | - | - |
//! | anything else | fatal | set STO |

use strata_hal::i2c::Operation;

use crate::registers::{Control, MasterState, Registers};
use crate::transaction::{Status, TransactionCell, TransactionRecord};

/// Control register actions computed for one interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Masks {
    pub set: Control,
    pub clear: Control,
}

impl Masks {
    const NONE: Self = Self {
        set: Control::empty(),
        clear: Control::empty(),
    };
}

/// Service one status interrupt for the bus behind `registers`
///
/// # Panics
/// On a status code the master engine does not know. Stop is asserted
/// first; the register state is no longer trustworthy after that.
pub fn service<R: Registers>(registers: &R, cell: &TransactionCell) {
    let code = registers.status();
    let Some(state) = MasterState::from_code(code) else {
        registers.set_control(Control::STOP);
        registers.clear_control(Control::INTERRUPT);
        panic!("invalid I2C state reached: {:#04x}", code);
    };

    let (masks, finished) = cell.with(|record| {
        let masks = advance(record, state, registers);
        (masks, !record.busy)
    });

    registers.set_control(masks.set);
    registers.clear_control(masks.clear | Control::INTERRUPT);

    if finished {
        cell.waker().wake();
    }
}

/// Apply one status code to the record
fn advance<R: Registers>(
    record: &mut TransactionRecord,
    state: MasterState,
    registers: &R,
) -> Masks {
    let mut masks = Masks::NONE;

    match state {
        MasterState::BusError => {
            record.complete(Status::BusError);
            masks.set = Control::ASSERT_ACK | Control::STOP;
        }
        MasterState::StartCondition => {
            registers.write_data(record.address_byte());
        }
        MasterState::RepeatedStart => {
            record.operation = Operation::Read;
            registers.write_data(record.address_byte());
        }
        MasterState::AddressWriteAck => {
            masks.clear = Control::START;
            if record.out_length == 0 {
                record.complete(Status::Success);
                masks.set = Control::STOP;
            } else {
                masks.set = transmit_next(record, registers);
            }
        }
        MasterState::AddressWriteNack => {
            masks.clear = Control::START;
            record.complete(Status::DeviceNotFound);
            masks.set = Control::STOP;
        }
        MasterState::DataWriteAck => {
            if record.position >= record.out_length {
                if record.repeated {
                    record.operation = Operation::Read;
                    record.position = 0;
                    masks.set = Control::START;
                } else {
                    record.complete(Status::Success);
                    masks.set = Control::STOP;
                }
            } else {
                masks.set = transmit_next(record, registers);
            }
        }
        MasterState::DataWriteNack => {
            // Device refused more data. The outcome keeps whatever the record
            // already says; `position` tells how far the write got.
            record.busy = false;
            masks.set = Control::STOP;
        }
        MasterState::ArbitrationLost => {
            masks.set = Control::START;
        }
        MasterState::AddressReadAck => {
            masks.clear = Control::START;
            match record.in_length {
                0 => {
                    record.complete(Status::Success);
                    masks.set = Control::STOP;
                }
                // The only byte is the last byte: NACK it
                1 => masks.clear |= Control::ASSERT_ACK,
                _ => masks.set = Control::ASSERT_ACK,
            }
        }
        MasterState::AddressReadNack => {
            masks.clear = Control::START;
            record.complete(Status::DeviceNotFound);
            masks.set = Control::STOP;
        }
        MasterState::DataReadAck => {
            record.store_in_byte(registers.data());
            if record.position >= record.in_length {
                // Every expected byte is in; nothing left to clock out.
                record.complete(Status::Success);
                masks.clear = Control::ASSERT_ACK;
                masks.set = Control::STOP;
            } else if record.position + 1 >= record.in_length {
                masks.clear = Control::ASSERT_ACK;
            } else {
                masks.set = Control::ASSERT_ACK;
            }
        }
        MasterState::DataReadNack => {
            if record.in_length != 0 {
                record.store_in_byte(registers.data());
            }
            record.complete(Status::Success);
            masks.set = Control::STOP;
        }
        MasterState::OwnAddressReceived | MasterState::Idle => {}
    }

    masks
}

/// Put the byte at the cursor on the bus
///
/// Returns the set mask: nothing, or STO if the buffer was revoked.
fn transmit_next<R: Registers>(record: &mut TransactionRecord, registers: &R) -> Control {
    match record.next_out_byte() {
        Some(byte) => {
            registers.write_data(byte);
            Control::empty()
        }
        None => {
            record.busy = false;
            Control::STOP
        }
    }
}
