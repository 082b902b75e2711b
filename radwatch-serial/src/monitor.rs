//! Monitor: Source-to-Pipeline Wiring
//!
//! ## Overview
//!
//! [`Monitor`] is the consumer side of the producer/single-consumer design:
//! it owns the [`Pipeline`] and the reader handle, and its [`Monitor::poll`]
//! is the *only* place pipeline state is ever mutated. The embedding
//! application calls `poll` on its UI tick (the original cadence is every
//! 100 ms), gets back the samples and source events produced since the last
//! tick, and then asks the pipeline whether this tick warrants a redraw.
//!
//! ```text
//! worker thread ──mpsc──▶ Monitor::poll ──▶ Pipeline::ingest_line ──▶ Sample
//!        ▲                      │
//!        └──── stop command ────┘ (cooperative; queued lines discarded)
//! ```
//!
//! ## Teardown semantics
//!
//! Stopping signals the worker and marks the monitor as stopping; from that
//! point every poll drains the channel and *discards* - records enqueued
//! after the stop decision must not reach the pipeline. Pipeline state is
//! preserved across stop, fault and close so the operator can still inspect
//! and export what was collected; only an explicit pipeline reset clears it.

use std::io::Read;

use radwatch_core::{Pipeline, PipelineConfig, Sample};

use crate::errors::IngestError;
use crate::ports::{open_port, DEFAULT_TIMEOUT};
use crate::reader::{LineReader, SourceMessage};

/// What a poll tick observed.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// A telemetry line was accepted by the pipeline
    Sample(Sample),
    /// The source failed; ingestion has stopped, state is preserved
    Fault(String),
    /// The source reached end-of-stream; ingestion has stopped
    Closed,
}

/// Owns a pipeline and (at most) one line source feeding it.
pub struct Monitor {
    pipeline: Pipeline,
    reader: Option<LineReader>,
    stopping: bool,
}

impl Monitor {
    /// A monitor with a fresh pipeline on the system clock.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_pipeline(Pipeline::new(config))
    }

    /// A monitor around an existing pipeline (tests inject a fixed clock).
    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            reader: None,
            stopping: false,
        }
    }

    /// Opens a serial port and starts ingesting from it.
    pub fn open(&mut self, port: &str, baud: u32) -> Result<(), IngestError> {
        let handle = open_port(port, baud, DEFAULT_TIMEOUT)?;
        log::info!("connected to {port} at {baud} baud");
        self.attach(handle);
        Ok(())
    }

    /// Starts ingesting from any byte source (mock device, replay file).
    ///
    /// A previously attached source is detached first.
    pub fn attach<R>(&mut self, source: R)
    where
        R: Read + Send + 'static,
    {
        self.detach();
        self.reader = Some(LineReader::spawn(source));
        self.stopping = false;
    }

    /// Whether a source is attached and ingestion has not been stopped.
    pub fn is_connected(&self) -> bool {
        self.reader.is_some() && !self.stopping
    }

    /// Drains everything the worker produced since the last tick.
    ///
    /// Never blocks. Once a stop has been observed (explicit [`Monitor::stop`],
    /// source fault, or end-of-stream) queued lines are discarded instead of
    /// processed.
    pub fn poll(&mut self) -> Vec<MonitorEvent> {
        let mut events = Vec::new();
        let Some(reader) = self.reader.as_ref() else {
            return events;
        };

        for message in reader.try_iter() {
            if self.stopping {
                continue; // drain and discard
            }
            match message {
                SourceMessage::Line(line) => {
                    if let Some(sample) = self.pipeline.ingest_line(&line) {
                        events.push(MonitorEvent::Sample(sample));
                    }
                }
                SourceMessage::Fault(fault) => {
                    log::error!("telemetry source fault: {fault}");
                    self.stopping = true;
                    events.push(MonitorEvent::Fault(fault));
                }
                SourceMessage::Closed => {
                    log::info!("telemetry source closed");
                    self.stopping = true;
                    events.push(MonitorEvent::Closed);
                }
            }
        }

        events
    }

    /// Signals the worker to stop; queued lines will be discarded.
    pub fn stop(&mut self) {
        if let Some(reader) = &self.reader {
            reader.stop();
        }
        self.stopping = true;
    }

    /// Stops and drops the current source, discarding anything still queued.
    /// Pipeline state survives; a new source can be attached afterwards.
    pub fn detach(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.stop();
            for _ in reader.try_iter() {} // discard, per the stop contract
        }
        self.stopping = false;
    }

    /// The owned pipeline (buffers, stats, display gating).
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Mutable pipeline access for reset/reconfigure.
    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }
}
