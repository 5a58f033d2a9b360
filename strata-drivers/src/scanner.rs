//! I2C bus scanner
//!
//! Probes every non-reserved 7-bit address with an address-only write and
//! collects the ones that acknowledge.

use heapless::Vec;
use strata_hal::i2c::{Error, ErrorKind, I2cBus};

/// First address outside the reserved low block
pub const FIRST_ADDRESS: u8 = 0x08;
/// Last address below the reserved high block
pub const LAST_ADDRESS: u8 = 0x77;
/// Number of addresses probed
pub const ADDRESS_COUNT: usize = (LAST_ADDRESS - FIRST_ADDRESS + 1) as usize;

/// Addresses that answered, in ascending order
pub type Found = Vec<u8, ADDRESS_COUNT>;

/// Probe 0x08..=0x77 and return the responding addresses
///
/// A missing acknowledgment or an unanswered probe means no device. Any
/// other bus error stops the scan and is returned.
pub fn scan<B: I2cBus + ?Sized>(bus: &mut B) -> Result<Found, B::Error> {
    let mut found = Found::new();

    for address in FIRST_ADDRESS..=LAST_ADDRESS {
        match bus.probe(address) {
            Ok(()) => {
                // Capacity covers every probed address
                let _ = found.push(address);
            }
            Err(e) => match e.kind() {
                ErrorKind::DeviceNotFound | ErrorKind::Timeout => {}
                _ => return Err(e),
            },
        }
    }

    #[cfg(feature = "defmt")]
    defmt::debug!("I2C scan: {} device(s)", found.len());

    Ok(found)
}
