//! Serial-line ingestion for RadWatch
//!
//! ## Overview
//!
//! This crate moves telemetry bytes from a device into the `radwatch-core`
//! pipeline under the producer/single-consumer model the pipeline requires:
//!
//! - [`LineReader`] - the single ingestion worker thread: reads byte chunks
//!   from any `io::Read` source, reassembles lines, hands them over a
//!   channel, stops cooperatively.
//! - [`Monitor`] - the single consumer: owns the [`Pipeline`], drains the
//!   channel on each poll tick, discards anything queued after a stop, and
//!   preserves pipeline state across disconnects.
//! - [`MockDevice`] - a scripted hardware-free source, byte-compatible with
//!   the real device, for development and tests.
//! - Port helpers - enumeration with descriptions and an open wrapper with
//!   the device defaults (1200 baud, 100 ms read timeout).
//!
//! ## Example
//!
//! ```no_run
//! use radwatch_core::PipelineConfig;
//! use radwatch_serial::{scan_ports, Monitor, DEFAULT_BAUD};
//!
//! let mut monitor = Monitor::new(PipelineConfig::default());
//!
//! let ports = scan_ports().expect("enumeration");
//! monitor.open(&ports[0].name, DEFAULT_BAUD).expect("open");
//!
//! loop {
//!     for event in monitor.poll() {
//!         // render samples, surface faults
//!     }
//!     # break;
//!     // sleep until the next UI tick
//! }
//! ```
//!
//! [`Pipeline`]: radwatch_core::Pipeline

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod mock;
pub mod monitor;
pub mod ports;
pub mod reader;

// Public API
pub use errors::IngestError;
pub use mock::MockDevice;
pub use monitor::{Monitor, MonitorEvent};
pub use ports::{open_port, scan_ports, PortEntry, DEFAULT_BAUD, DEFAULT_TIMEOUT};
pub use reader::{LineReader, SourceMessage};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
