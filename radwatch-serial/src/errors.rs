//! Error types for serial ingestion
//!
//! Runtime stream problems (timeouts, device unplug) are not errors at this
//! level - they travel through the reader channel as messages so the
//! consumer can surface them without tearing the pipeline down. The enum
//! here covers the setup operations that can fail before a stream exists.

use thiserror::Error;

/// Failures opening or enumerating serial ports.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The named port could not be opened
    #[error("failed to open serial port {port}: {source}")]
    Open {
        /// Port name as given (e.g. "/dev/ttyUSB0", "COM3")
        port: String,
        /// Underlying driver error
        source: serialport::Error,
    },

    /// Port enumeration failed
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[from] serialport::Error),
}
