//! The Dose-Filtering Pipeline
//!
//! ## Overview
//!
//! [`Pipeline`] is the single consumer-side entry point: feed it raw
//! telemetry lines, get back display-ready samples. Per accepted line the
//! stages run in fixed order, each consuming the previous stage's output:
//!
//! ```text
//! line ──▶ parse ──▶ resolve timestamp ──▶ moving average ──▶ append
//!            │                                                  │
//!            ▼                                                  ▼
//!      historical log                          short/long averages, alarm
//!                                                               │
//!                                                               ▼
//!                                                  classify ──▶ Sample
//! ```
//!
//! No stage reads ahead, and a line that fails to parse mutates nothing -
//! not even the historical log.
//!
//! ## Ownership & concurrency
//!
//! The pipeline is deliberately **not** thread-safe and carries no internal
//! locking. The intended deployment is a single ingestion worker pushing
//! lines over a channel and a single consumer context (the UI thread)
//! draining that channel and calling [`Pipeline::ingest_line`]; only the
//! channel is ever shared. See `radwatch-serial` for that wiring.
//!
//! ## Display pacing
//!
//! Ingestion cadence is the device's business; rendering cadence is not.
//! After draining lines, the consumer asks [`Pipeline::display_action`]
//! whether this tick warrants a full redraw (at most once per configured
//! interval) or only a refresh of the scalar statistics.
//!
//! ## Example
//!
//! ```rust
//! use radwatch_core::pipeline::Pipeline;
//! use radwatch_core::config::PipelineConfig;
//!
//! let mut pipeline = Pipeline::new(PipelineConfig::default());
//!
//! let line = "01.01.24|10:00:00|52.229700|21.012200|120|8|1.2|5.0|0.08|0.08";
//! let sample = pipeline.ingest_line(line).expect("valid line");
//!
//! assert_eq!(sample.filtered_dose, 0.08);
//! assert_eq!(sample.classification.level.name(), "normal");
//! assert!(!sample.alarm);
//! ```

use std::collections::VecDeque;

use crate::config::PipelineConfig;
use crate::filter::MovingAverage;
use crate::history::DoseHistory;
use crate::levels::Classification;
use crate::record::TelemetryRecord;
use crate::stats::{HistoryStats, RedrawGate};
use crate::time::{SystemClock, TimeSource};

/// Retention cap of the historical record log.
///
/// Larger than any realistic plot window (default N = 960) so exports can
/// reach further back than the live view.
pub const HISTORICAL_LOG_CAP: usize = 5000;

/// Display-ready output for one accepted telemetry line.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// The parsed record as the device sent it
    pub record: TelemetryRecord,
    /// Raw instantaneous dose, μSv/h
    pub raw_dose: f32,
    /// Dose after moving-average smoothing, μSv/h
    pub filtered_dose: f32,
    /// Short-term rolling average including this sample, μSv/h
    pub short_term_avg: f32,
    /// Retained-window average including this sample, μSv/h
    pub long_term_avg: f32,
    /// Severity classification of the filtered dose
    pub classification: Classification,
    /// Whether this sample exceeded the alarm threshold
    pub alarm: bool,
}

/// What the display layer should do on this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayAction {
    /// Full time-series redraw is due; stats snapshot included
    Redraw(HistoryStats),
    /// Too soon for a redraw; refresh the scalar stats only
    StatsOnly(HistoryStats),
}

/// The streaming dose pipeline: parser, filter, histories, alarms, pacing.
pub struct Pipeline {
    config: PipelineConfig,
    filter: MovingAverage,
    history: DoseHistory,
    gate: RedrawGate,
    historical: VecDeque<TelemetryRecord>,
    clock: Box<dyn TimeSource + Send>,
}

impl Pipeline {
    /// Creates a pipeline on the system clock.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// Creates a pipeline on an explicit clock (fixed clock in tests).
    pub fn with_clock(config: PipelineConfig, clock: Box<dyn TimeSource + Send>) -> Self {
        let filter = MovingAverage::new(config.moving_avg_window);
        let history = DoseHistory::new(
            config.max_data_points(),
            config.short_term_window,
            config.alarm_threshold,
        );
        let gate = RedrawGate::new(config.plot_min_interval_ms);

        Self {
            config,
            filter,
            history,
            gate,
            historical: VecDeque::new(),
            clock,
        }
    }

    /// Ingests one raw telemetry line.
    ///
    /// Returns `None` for a malformed line (logged at debug level, no state
    /// touched). For an accepted line: the record enters the historical log,
    /// the dose runs through the filter, every history series is appended,
    /// and the display-ready [`Sample`] comes back.
    pub fn ingest_line(&mut self, line: &str) -> Option<Sample> {
        let record = match TelemetryRecord::parse(line, self.clock.as_ref()) {
            Ok(record) => record,
            Err(err) => {
                log::debug!("dropping telemetry line ({err}): {line:?}");
                return None;
            }
        };

        self.historical.push_back(record.clone());
        while self.historical.len() > HISTORICAL_LOG_CAP {
            self.historical.pop_front();
        }

        let raw_dose = record.dose();
        let filtered_dose = self.filter.apply(raw_dose);
        let outcome = self.history.append(record.timestamp, filtered_dose);
        let classification = self.config.levels.classify(filtered_dose);

        Some(Sample {
            record,
            raw_dose,
            filtered_dose,
            short_term_avg: outcome.short_term,
            long_term_avg: outcome.long_term,
            classification,
            alarm: outcome.alarm,
        })
    }

    /// Decides between a full redraw and a stats-only refresh for this tick.
    pub fn display_action(&mut self) -> DisplayAction {
        let stats = self.stats();
        if self.gate.check(self.clock.now()) {
            DisplayAction::Redraw(stats)
        } else {
            DisplayAction::StatsOnly(stats)
        }
    }

    /// Current scalar statistics (O(window) scan over the filtered buffer).
    pub fn stats(&self) -> HistoryStats {
        HistoryStats::compute(&self.history)
    }

    /// The synchronized history buffers and alarm list.
    pub fn history(&self) -> &DoseHistory {
        &self.history
    }

    /// The filter's raw trailing window (most recent ≤ W readings).
    pub fn raw_window(&self) -> &crate::buffer::RingBuffer<f32> {
        self.filter.raw_window()
    }

    /// The historical record log, oldest first (cap [`HISTORICAL_LOG_CAP`]).
    pub fn historical(&self) -> &VecDeque<TelemetryRecord> {
        &self.historical
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clears filter, histories, alarms and the redraw gate.
    ///
    /// The historical record log survives a reset: it backs export, not the
    /// plot. Subsequent appends behave as from a fresh pipeline.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.history.reset(self.config.max_data_points());
        self.gate.reset();
    }

    /// Applies a new configuration, reallocating buffers to the new
    /// capacities via a reset.
    pub fn reconfigure(&mut self, config: PipelineConfig) {
        self.filter = MovingAverage::new(config.moving_avg_window);
        self.history = DoseHistory::new(
            config.max_data_points(),
            config.short_term_window,
            config.alarm_threshold,
        );
        self.gate = RedrawGate::new(config.plot_min_interval_ms);
        self.config = config;
    }
}
