//! Adapters: implementations of the port traits
//!
//! - `cw_keyer`: Keyer over a radio channel's CW output
//! - `line_keyer`: Keyer over a serial RTS/DTR line
//! - `serial_port`: serialport-backed SerialFactory
//! - `mock_radio`: in-memory RadioDriver for development and tests

pub mod cw_keyer;
pub mod line_keyer;
pub mod mock_radio;
pub mod serial_port;

pub use cw_keyer::CwKeyer;
pub use line_keyer::LineKeyer;
pub use mock_radio::{ChannelEvent, MockChannel, MockRadio};
pub use serial_port::SerialPortFactory;
