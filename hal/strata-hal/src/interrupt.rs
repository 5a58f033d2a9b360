//! Interrupt handler registration
//!
//! Peripheral drivers register an [`InterruptHandler`] against their IRQ
//! number during initialization. [`DispatchTable`] is a RAM vector table the
//! platform's vector stubs forward to.

use core::cell::RefCell;

use critical_section::Mutex;

/// Interrupt request number as used by the interrupt controller
pub type IrqNumber = u16;

/// Code run when an interrupt fires
///
/// Handlers run in interrupt context and must not block.
pub trait InterruptHandler: Sync {
    /// Service the interrupt
    fn on_interrupt(&self);
}

/// A handler bound to an IRQ number
#[derive(Clone, Copy)]
pub struct InterruptRegistration {
    /// Interrupt request number
    pub irq: IrqNumber,
    /// Handler invoked when `irq` fires
    pub handler: &'static dyn InterruptHandler,
}

impl core::fmt::Debug for InterruptRegistration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InterruptRegistration")
            .field("irq", &self.irq)
            .finish_non_exhaustive()
    }
}

/// Interrupt controller
pub trait InterruptController {
    /// Install the handler and unmask its interrupt
    fn enable(&mut self, registration: InterruptRegistration);
}

/// RAM vector table for `N` interrupt lines
///
/// ```ignore
/// static VECTORS: DispatchTable<64> = DispatchTable::new();
///
/// #[interrupt]
/// fn I2C0() {
///     VECTORS.dispatch(10);
/// }
/// ```
pub struct DispatchTable<const N: usize> {
    handlers: Mutex<RefCell<[Option<&'static dyn InterruptHandler>; N]>>,
}

impl<const N: usize> Default for DispatchTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DispatchTable<N> {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            handlers: Mutex::new(RefCell::new([None; N])),
        }
    }

    /// Install `registration`, replacing any previous handler for its IRQ
    ///
    /// # Panics
    /// If the IRQ number does not fit in the table.
    pub fn register(&self, registration: InterruptRegistration) {
        let index = registration.irq as usize;
        assert!(index < N, "IRQ {} outside dispatch table", registration.irq);
        critical_section::with(|cs| {
            self.handlers.borrow_ref_mut(cs)[index] = Some(registration.handler);
        });
    }

    /// Check whether a handler is installed for `irq`
    pub fn is_registered(&self, irq: IrqNumber) -> bool {
        self.handler(irq).is_some()
    }

    /// Run the handler installed for `irq`
    ///
    /// Returns false if no handler is installed.
    pub fn dispatch(&self, irq: IrqNumber) -> bool {
        match self.handler(irq) {
            Some(handler) => {
                handler.on_interrupt();
                true
            }
            None => false,
        }
    }

    fn handler(&self, irq: IrqNumber) -> Option<&'static dyn InterruptHandler> {
        critical_section::with(|cs| {
            self.handlers
                .borrow_ref(cs)
                .get(irq as usize)
                .copied()
                .flatten()
        })
    }
}

impl<const N: usize> InterruptController for &DispatchTable<N> {
    fn enable(&mut self, registration: InterruptRegistration) {
        self.register(registration);
    }
}
