//! Error types for the telemetry pipeline
//!
//! Pipeline-level errors are deliberately recoverable: a malformed line is
//! dropped (logged, never fatal), an ambiguous timestamp falls back to the
//! wall clock, and a desynchronized history is reconciled rather than
//! panicked on. The enums here cover the two places a caller can actually
//! observe a failure: line parsing and configuration I/O.

use thiserror::Error;

/// Why a telemetry line could not be turned into a record.
///
/// Kept small and `Copy`: parse failures happen per line in the ingest hot
/// path and are routinely constructed and discarded.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The line split into fewer fields than the record format requires.
    #[error("line has {got} of {min} required fields")]
    TooFewFields {
        /// Fields actually present after splitting on the delimiter
        got: usize,
        /// Minimum fields the record format requires
        min: usize,
    },
}

/// Configuration load/save failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Filesystem access failed
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File exists but is not valid configuration JSON
    #[error("config format error: {0}")]
    Format(#[from] serde_json::Error),
}
