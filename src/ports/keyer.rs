//! Keyer port trait

use crate::domain::OokResult;

/// Trait for anything that can switch a carrier on and off.
///
/// Implementations handle whatever sub-steps the hardware needs internally
/// (RX path deactivation, CW output toggling, TX path activation, a serial
/// control line). A keyer is a single-owner resource: the transmission driver
/// borrows it for one call and never keeps it.
pub trait Keyer {
    /// Assert (`true`) or de-assert (`false`) the carrier
    fn set_output(&mut self, on: bool) -> OokResult<()>;

    /// Unconditional shutdown: carrier fully off, transmit path deactivated
    fn force_off(&mut self) -> OokResult<()>;
}

impl<K: Keyer + ?Sized> Keyer for &mut K {
    fn set_output(&mut self, on: bool) -> OokResult<()> {
        (**self).set_output(on)
    }

    fn force_off(&mut self) -> OokResult<()> {
        (**self).force_off()
    }
}

impl<K: Keyer + ?Sized> Keyer for Box<K> {
    fn set_output(&mut self, on: bool) -> OokResult<()> {
        (**self).set_output(on)
    }

    fn force_off(&mut self) -> OokResult<()> {
        (**self).force_off()
    }
}
