//! Per-bus transaction record
//!
//! Each bus owns exactly one [`TransactionCell`]. Ownership of the record
//! alternates between two contexts:
//!
//! - the foreground driver, before it requests a start and after `busy`
//!   reads false;
//! - the interrupt handler, while `busy` is true.
//!
//! Every access goes through a short critical section, and the record keeps
//! the caller's buffers only as raw parts that the foreground revokes before
//! its call returns.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use critical_section::Mutex;
use embassy_sync::waitqueue::AtomicWaker;
use strata_hal::i2c::{address_byte, Operation, Transaction};

/// Outcome code of the last transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Not finished, or finished without the handler recording an outcome
    InProgress,
    /// Completed normally
    Success,
    /// Address byte was not acknowledged
    DeviceNotFound,
    /// Controller reported a bus error
    BusError,
}

/// Raw parts of the caller's buffers
struct Buffers {
    data_out: *const u8,
    data_in: *mut u8,
}

/// State of the in-flight (or last) transaction on one bus
pub struct TransactionRecord {
    pub(crate) operation: Operation,
    pub(crate) address: u8,
    pub(crate) out_length: usize,
    pub(crate) in_length: usize,
    pub(crate) position: usize,
    pub(crate) repeated: bool,
    pub(crate) busy: bool,
    pub(crate) status: Status,
    pub(crate) timeout: Duration,
    buffers: Option<Buffers>,
}

// SAFETY: the buffer pointers are only dereferenced inside the owning cell's
// critical section, while `busy` is set and the foreground call that lent
// them is still running. `TransactionCell::finish` drops them before that
// call returns.
unsafe impl Send for TransactionRecord {}

impl TransactionRecord {
    const fn new() -> Self {
        Self {
            operation: Operation::Write,
            address: 0,
            out_length: 0,
            in_length: 0,
            position: 0,
            repeated: false,
            busy: false,
            status: Status::InProgress,
            timeout: Duration::ZERO,
            buffers: None,
        }
    }

    /// Address plus direction bit for the current phase
    pub(crate) fn address_byte(&self) -> u8 {
        address_byte(self.address, self.operation)
    }

    /// Take the byte at the cursor and advance
    pub(crate) fn next_out_byte(&mut self) -> Option<u8> {
        if !self.busy || self.position >= self.out_length {
            return None;
        }
        let buffers = self.buffers.as_ref()?;
        // SAFETY: position < out_length, the length of the lent slice, and
        // the slice is alive while busy (see the Send impl).
        let byte = unsafe { *buffers.data_out.add(self.position) };
        self.position += 1;
        Some(byte)
    }

    /// Store `byte` at the cursor and advance
    ///
    /// Returns false if the buffer is full or no longer lent.
    pub(crate) fn store_in_byte(&mut self, byte: u8) -> bool {
        if !self.busy || self.position >= self.in_length {
            return false;
        }
        let Some(buffers) = self.buffers.as_ref() else {
            return false;
        };
        // SAFETY: position < in_length, the length of the lent slice, and
        // the slice is alive and exclusively lent while busy.
        unsafe { *buffers.data_in.add(self.position) = byte };
        self.position += 1;
        true
    }

    /// Record the outcome and hand the record back to the foreground
    pub(crate) fn complete(&mut self, status: Status) {
        self.status = status;
        self.busy = false;
    }

    fn snapshot(&self) -> TransactionSnapshot {
        TransactionSnapshot {
            operation: self.operation,
            address: self.address,
            out_length: self.out_length,
            in_length: self.in_length,
            position: self.position,
            repeated: self.repeated,
            busy: self.busy,
            status: self.status,
            timeout: self.timeout,
        }
    }
}

/// Copy of a transaction record without its buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionSnapshot {
    /// Direction of the current (or final) phase
    pub operation: Operation,
    /// 7-bit device address
    pub address: u8,
    /// Bytes to transmit
    pub out_length: usize,
    /// Capacity of the receive buffer
    pub in_length: usize,
    /// Cursor into the active buffer
    pub position: usize,
    /// Combined write-then-read transaction
    pub repeated: bool,
    /// Owned by the interrupt handler
    pub busy: bool,
    /// Outcome code
    pub status: Status,
    /// Deadline for the whole transaction
    pub timeout: Duration,
}

/// What the foreground learns when it takes the record back
#[derive(Debug, Clone, Copy)]
pub(crate) struct Outcome {
    pub status: Status,
    pub was_busy: bool,
    pub out_length: usize,
    pub in_length: usize,
}

/// The one transaction record of a bus, plus its completion signal
pub struct TransactionCell {
    record: Mutex<RefCell<TransactionRecord>>,
    initialized: AtomicBool,
    waker: AtomicWaker,
}

impl Default for TransactionCell {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for TransactionCell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransactionCell")
            .field("record", &self.snapshot())
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl TransactionCell {
    /// Create an idle record for a bus that is not yet initialized
    pub const fn new() -> Self {
        Self {
            record: Mutex::new(RefCell::new(TransactionRecord::new())),
            initialized: AtomicBool::new(false),
            waker: AtomicWaker::new(),
        }
    }

    /// Run `f` with exclusive access to the record
    pub(crate) fn with<T>(&self, f: impl FnOnce(&mut TransactionRecord) -> T) -> T {
        critical_section::with(|cs| f(&mut self.record.borrow_ref_mut(cs)))
    }

    /// Overwrite the record with `transaction` and hand it to the handler
    ///
    /// A combined transaction with nothing to write starts directly in the
    /// read phase.
    ///
    /// # Panics
    /// If a transaction is already in flight on this bus.
    pub(crate) fn load(&self, transaction: &mut Transaction<'_>) {
        let data_out = transaction.data_out.as_ptr();
        let data_in = transaction.data_in.as_mut_ptr();
        let (operation, repeated) = if transaction.repeated && transaction.data_out.is_empty() {
            (Operation::Read, false)
        } else {
            (transaction.operation, transaction.repeated)
        };

        self.with(|record| {
            assert!(!record.busy, "I2C transaction started while bus busy");
            *record = TransactionRecord {
                operation,
                address: transaction.address,
                out_length: transaction.data_out.len(),
                in_length: transaction.data_in.len(),
                position: 0,
                repeated,
                busy: true,
                status: Status::InProgress,
                timeout: transaction.timeout,
                buffers: Some(Buffers { data_out, data_in }),
            };
        });
    }

    /// Take the record back from the handler, revoking the buffers
    pub(crate) fn finish(&self) -> Outcome {
        self.with(|record| {
            let outcome = Outcome {
                status: record.status,
                was_busy: record.busy,
                out_length: record.out_length,
                in_length: record.in_length,
            };
            record.busy = false;
            record.buffers = None;
            outcome
        })
    }

    /// Check whether the handler still owns the record
    pub fn is_busy(&self) -> bool {
        self.with(|record| record.busy)
    }

    /// Current state of the record
    pub fn snapshot(&self) -> TransactionSnapshot {
        self.with(|record| record.snapshot())
    }

    /// Check whether the bus owning this record was initialized
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub(crate) fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::Release);
    }

    /// Completion signal woken by the handler
    pub(crate) fn waker(&self) -> &AtomicWaker {
        &self.waker
    }
}
