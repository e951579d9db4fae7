//! Line keyer: keys a transmitter from a serial control line
//!
//! Many transmitters and keying interfaces take a simple switched input; a
//! USB-serial adapter's RTS or DTR line drives it through a transistor or
//! opto-coupler. `active_low` inverts the line for interfaces that key on
//! a released line.

use std::time::Duration;

use crate::domain::{ControlLine, OokResult};
use crate::ports::{Keyer, SerialConnection};

/// Keyer over a serial modem control line
pub struct LineKeyer {
    serial: Box<dyn SerialConnection>,
    line: ControlLine,
    active_low: bool,
    keyed: bool,
}

impl LineKeyer {
    pub fn new(serial: Box<dyn SerialConnection>, line: ControlLine) -> Self {
        Self {
            serial,
            line,
            active_low: false,
            keyed: false,
        }
    }

    pub fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    pub fn is_keyed(&self) -> bool {
        self.keyed
    }

    fn drive(&mut self, on: bool) -> OokResult<()> {
        self.serial.set_line(self.line, on != self.active_low)
    }
}

impl Keyer for LineKeyer {
    fn set_output(&mut self, on: bool) -> OokResult<()> {
        self.drive(on)?;
        self.keyed = on;
        Ok(())
    }

    fn force_off(&mut self) -> OokResult<()> {
        self.drive(false)?;
        self.keyed = false;
        Ok(())
    }
}

/// Safety: release the line if the keyer is dropped while keyed.
/// Retries with increasing delays in case the adapter is momentarily busy.
impl Drop for LineKeyer {
    fn drop(&mut self) {
        if self.keyed {
            for delay_ms in [0, 10, 50] {
                if delay_ms > 0 {
                    std::thread::sleep(Duration::from_millis(delay_ms));
                }
                if self.force_off().is_ok() {
                    break;
                }
            }
            if self.keyed {
                log::error!("CRITICAL: Failed to release {:?} on drop. Transmitter may still be keyed!", self.line);
            }
        }
        let _ = self.serial.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OokError;
    use std::sync::{Arc, Mutex};

    struct MockSerial {
        log: Arc<Mutex<Vec<(ControlLine, bool)>>>,
        failures_left: usize,
    }

    impl SerialConnection for MockSerial {
        fn set_line(&mut self, line: ControlLine, asserted: bool) -> OokResult<()> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(OokError::Serial("busy".into()));
            }
            self.log.lock().unwrap().push((line, asserted));
            Ok(())
        }
        fn close(&mut self) -> OokResult<()> {
            Ok(())
        }
    }

    fn make_keyer(line: ControlLine) -> (LineKeyer, Arc<Mutex<Vec<(ControlLine, bool)>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mock = MockSerial {
            log: Arc::clone(&log),
            failures_left: 0,
        };
        (LineKeyer::new(Box::new(mock), line), log)
    }

    #[test]
    fn keys_selected_line() {
        let (mut keyer, log) = make_keyer(ControlLine::Dtr);
        keyer.set_output(true).unwrap();
        keyer.set_output(false).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec![(ControlLine::Dtr, true), (ControlLine::Dtr, false)]
        );
    }

    #[test]
    fn active_low_inverts_line() {
        let (keyer, log) = make_keyer(ControlLine::Rts);
        let mut keyer = keyer.with_active_low(true);
        keyer.set_output(true).unwrap();
        keyer.force_off().unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec![(ControlLine::Rts, false), (ControlLine::Rts, true)]
        );
    }

    #[test]
    fn drop_while_keyed_releases_line() {
        let (mut keyer, log) = make_keyer(ControlLine::Rts);
        keyer.set_output(true).unwrap();
        drop(keyer);
        assert_eq!(log.lock().unwrap().last(), Some(&(ControlLine::Rts, false)));
    }

    #[test]
    fn drop_retries_release() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mock = MockSerial {
            log: Arc::clone(&log),
            failures_left: 0,
        };
        let mut keyer = LineKeyer::new(Box::new(mock), ControlLine::Rts);
        keyer.set_output(true).unwrap();
        // Next two release attempts fail, the third goes through
        keyer.serial = Box::new(MockSerial {
            log: Arc::clone(&log),
            failures_left: 2,
        });
        drop(keyer);
        assert_eq!(log.lock().unwrap().last(), Some(&(ControlLine::Rts, false)));
    }

    #[test]
    fn failed_key_on_is_not_marked_keyed() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mock = MockSerial {
            log,
            failures_left: 1,
        };
        let mut keyer = LineKeyer::new(Box::new(mock), ControlLine::Rts);
        assert!(keyer.set_output(true).is_err());
        assert!(!keyer.is_keyed());
    }
}
