//! Serial port adapter using the `serialport` crate
//!
//! Implements `SerialFactory` and `SerialConnection`. Only the modem control
//! lines are used: an interface that keys a transmitter from RTS or DTR
//! needs no data traffic at all.

use std::time::Duration;

use crate::domain::{ControlLine, OokError, OokResult, SerialPortInfo};
use crate::ports::{SerialConnection, SerialFactory};

/// Zero-sized factory for creating serial port connections.
pub struct SerialPortFactory;

impl SerialFactory for SerialPortFactory {
    fn list_ports() -> OokResult<Vec<SerialPortInfo>> {
        let ports = serialport::available_ports()
            .map_err(|e| OokError::Serial(format!("Failed to list ports: {e}")))?;

        Ok(ports
            .into_iter()
            .map(|p| {
                let port_type = match &p.port_type {
                    serialport::SerialPortType::UsbPort(info) => {
                        format!("USB ({:04X}:{:04X})", info.vid, info.pid)
                    }
                    serialport::SerialPortType::PciPort => "PCI".to_string(),
                    serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                    serialport::SerialPortType::Unknown => "Native".to_string(),
                };
                SerialPortInfo {
                    name: p.port_name,
                    port_type,
                }
            })
            .collect())
    }

    fn open(port: &str, baud_rate: u32) -> OokResult<Box<dyn SerialConnection>> {
        let serial = serialport::new(port, baud_rate)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|e| OokError::Serial(format!("Failed to open {port}: {e}")))?;

        let mut connection = SerialPortConnection {
            port: serial,
            connected: true,
        };
        // Some drivers raise both lines on open; start released.
        connection.set_line(ControlLine::Rts, false)?;
        connection.set_line(ControlLine::Dtr, false)?;

        log::info!("Opened {port} at {baud_rate} baud");
        Ok(Box::new(connection))
    }
}

/// An open serial port connection wrapping the `serialport` crate.
pub struct SerialPortConnection {
    port: Box<dyn serialport::SerialPort>,
    connected: bool,
}

impl SerialConnection for SerialPortConnection {
    fn set_line(&mut self, line: ControlLine, asserted: bool) -> OokResult<()> {
        if !self.connected {
            return Err(OokError::Serial("Port is closed".into()));
        }
        let result = match line {
            ControlLine::Rts => self.port.write_request_to_send(asserted),
            ControlLine::Dtr => self.port.write_data_terminal_ready(asserted),
        };
        result.map_err(|e| OokError::Serial(format!("Failed to set {line:?}={asserted}: {e}")))
    }

    fn close(&mut self) -> OokResult<()> {
        self.connected = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_ports_does_not_panic() {
        // May be empty or unsupported in CI
        let _ = SerialPortFactory::list_ports();
    }

    #[test]
    fn open_bad_port_errors() {
        let result = SerialPortFactory::open("/dev/nonexistent-port-that-does-not-exist", 9600);
        assert!(matches!(result, Err(OokError::Serial(_))));
    }
}
