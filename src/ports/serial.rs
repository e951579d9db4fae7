//! Serial port traits
//!
//! Split into two traits:
//! - `SerialFactory`: static methods for listing and opening ports
//! - `SerialConnection`: instance methods for driving the control lines

use crate::domain::{ControlLine, OokResult, SerialPortInfo};

/// Factory for creating serial connections.
pub trait SerialFactory {
    /// List available serial ports on the system
    fn list_ports() -> OokResult<Vec<SerialPortInfo>>;

    /// Open a serial port at the given baud rate, returning a boxed connection
    fn open(port: &str, baud_rate: u32) -> OokResult<Box<dyn SerialConnection>>;
}

/// Trait for an open serial port connection.
pub trait SerialConnection: Send {
    /// Assert or release a modem control line
    fn set_line(&mut self, line: ControlLine, asserted: bool) -> OokResult<()>;

    /// Close the connection
    fn close(&mut self) -> OokResult<()>;
}
