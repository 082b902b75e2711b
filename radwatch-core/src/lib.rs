//! Streaming dose-filtering pipeline for RadWatch
//!
//! Turns raw pipe-delimited GPS/Geiger telemetry lines into display-ready
//! samples: moving-average smoothing, short- and long-term rolling
//! averages, 4-level severity classification, threshold alarms, and
//! synchronized bounded histories for plotting, with redraws rate-limited
//! independently of ingestion.
//!
//! The crate is UI-agnostic and device-agnostic: it consumes text lines and
//! exposes samples, buffers and statistics. Serial-port wiring lives in
//! `radwatch-serial`.
//!
//! ```rust
//! use radwatch_core::{Pipeline, PipelineConfig};
//!
//! let mut pipeline = Pipeline::new(PipelineConfig::default());
//!
//! let sample = pipeline
//!     .ingest_line("01.01.24|10:00:00|52.229700|21.012200|120|8|1.2|5.0|0.08|0.08")
//!     .expect("well-formed line");
//!
//! assert_eq!(sample.classification.level.name(), "normal");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod buffer;
pub mod config;
pub mod errors;
pub mod filter;
pub mod history;
pub mod levels;
pub mod pipeline;
pub mod record;
pub mod stats;
pub mod time;

// Public API
pub use config::PipelineConfig;
pub use errors::{ConfigError, ParseError};
pub use history::{AlarmEvent, DoseHistory};
pub use levels::{Classification, DoseBand, DoseLevels, Severity};
pub use pipeline::{DisplayAction, Pipeline, Sample};
pub use record::TelemetryRecord;
pub use stats::HistoryStats;
pub use time::{SystemClock, TimeSource, Timestamp};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
