//! CW keyer: keys a radio channel by toggling its CW output
//!
//! "On" deactivates RX, enables the CW carrier and activates TX.
//! "Off" deactivates RX, selects the IQ path (which sends nothing while no
//! samples are streamed) and keeps TX active, so the next "on" is quick.
//! The forced shutdown disables the CW output and deactivates TX.

use crate::domain::{Direction, OokResult};
use crate::ports::{Keyer, RadioChannel};

/// Keyer over a borrowed radio channel. Lives for one transmission only.
pub struct CwKeyer<'a> {
    channel: &'a mut dyn RadioChannel,
    keyed: bool,
}

impl<'a> CwKeyer<'a> {
    pub fn new(channel: &'a mut dyn RadioChannel) -> Self {
        Self {
            channel,
            keyed: false,
        }
    }

    pub fn is_keyed(&self) -> bool {
        self.keyed
    }
}

impl Keyer for CwKeyer<'_> {
    fn set_output(&mut self, on: bool) -> OokResult<()> {
        self.channel.activate(Direction::Rx, false)?;
        self.channel.set_cw_outputs(false, on)?;
        // the CW output now follows `on` even if TX activation fails below
        self.keyed = on;
        self.channel.activate(Direction::Tx, true)
    }

    fn force_off(&mut self) -> OokResult<()> {
        // Both steps run even if the first one fails
        let cw = self.channel.set_cw_outputs(false, false);
        let tx = self.channel.activate(Direction::Tx, false);
        self.keyed = false;
        cw.and(tx)
    }
}

/// Safety: never leave the carrier keyed if the keyer is dropped mid-transmission.
impl Drop for CwKeyer<'_> {
    fn drop(&mut self) {
        if self.keyed {
            if let Err(e) = self.force_off() {
                log::error!("CRITICAL: Failed to release carrier on drop: {e}");
            }
        }
    }
}
