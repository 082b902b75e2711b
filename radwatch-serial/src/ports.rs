//! Serial Port Enumeration and Opening
//!
//! Thin wrappers over the `serialport` driver: list candidate ports with a
//! human-readable description for the port picker, and open a named port
//! with the device's line parameters. The read timeout is deliberately
//! short - the reader worker treats a timeout as "no data yet" and uses it
//! as its cooperative-stop check point.

use std::fmt;
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};

use crate::errors::IngestError;

/// Device line rate; the telemetry firmware ships at 1200 baud.
pub const DEFAULT_BAUD: u32 = 1200;

/// Read timeout; bounds how long a stop signal can go unnoticed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// One enumerated serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortEntry {
    /// OS port name (e.g. "/dev/ttyUSB0", "COM3")
    pub name: String,
    /// Human-readable device description
    pub description: String,
}

impl fmt::Display for PortEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.description)
    }
}

/// Lists available serial ports with descriptions.
pub fn scan_ports() -> Result<Vec<PortEntry>, IngestError> {
    let ports = serialport::available_ports()?;

    Ok(ports
        .into_iter()
        .map(|port| {
            let description = match port.port_type {
                SerialPortType::UsbPort(info) => info
                    .product
                    .unwrap_or_else(|| "USB serial device".to_string()),
                SerialPortType::BluetoothPort => "Bluetooth serial device".to_string(),
                SerialPortType::PciPort => "PCI serial device".to_string(),
                SerialPortType::Unknown => "Serial device".to_string(),
            };
            PortEntry {
                name: port.port_name,
                description,
            }
        })
        .collect())
}

/// Opens a named port at `baud` with the given read timeout.
pub fn open_port(
    name: &str,
    baud: u32,
    timeout: Duration,
) -> Result<Box<dyn SerialPort>, IngestError> {
    serialport::new(name, baud)
        .timeout(timeout)
        .open()
        .map_err(|source| IngestError::Open {
            port: name.to_string(),
            source,
        })
}
