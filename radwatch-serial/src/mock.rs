//! Mock Telemetry Device
//!
//! A scripted device for development and tests without hardware: walks a
//! short GPS path in central Warsaw while the dose cycles through a small
//! ramp, emitting one byte-compatible telemetry line per interval. Because
//! it is just an `io::Read`, everything downstream - reader worker, monitor,
//! pipeline - runs the exact code paths it runs against a real port.

use std::io::{self, Read};
use std::time::{Duration, Instant};

use chrono::Local;

/// Scripted walk through central Warsaw.
const MOCK_PATH: [(f64, f64); 5] = [
    (52.2297, 21.0122),
    (52.2298, 21.0125),
    (52.2299, 21.0128),
    (52.2300, 21.0131),
    (52.2301, 21.0134),
];

/// Dose ramp: 0.05 μSv/h per path step.
const DOSE_STEP: f32 = 0.05;

/// Fake telemetry source implementing `io::Read`.
///
/// ## Example
///
/// ```no_run
/// use radwatch_serial::MockDevice;
/// use radwatch_serial::LineReader;
///
/// // one line every 2 seconds, forever (the hardware-free default)
/// let reader = LineReader::spawn(MockDevice::new());
/// ```
pub struct MockDevice {
    index: usize,
    interval: Duration,
    next_emit: Instant,
    remaining: Option<usize>,
    pending: Vec<u8>,
}

impl MockDevice {
    /// A device emitting one line every 2 seconds, like the real hardware.
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(2))
    }

    /// A device emitting at a custom cadence (tests use `Duration::ZERO`).
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            index: 0,
            interval,
            next_emit: Instant::now(),
            remaining: None,
            pending: Vec::new(),
        }
    }

    /// Caps the device at `lines` emissions, then end-of-stream.
    pub fn limited(mut self, lines: usize) -> Self {
        self.remaining = Some(lines);
        self
    }

    fn next_line(&mut self) -> String {
        self.index = (self.index + 1) % MOCK_PATH.len();
        let (lat, lon) = MOCK_PATH[self.index];
        let dose = DOSE_STEP + self.index as f32 * DOSE_STEP;

        format!(
            "01.01.2024|{}|{lat:.6}|{lon:.6}|120|8|1.2|5.0|{dose:.3}|{dose:.3}\n",
            Local::now().format("%H:%M:%S"),
        )
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Read for MockDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            if self.remaining == Some(0) {
                return Ok(0); // scripted lines exhausted: end-of-stream
            }

            let now = Instant::now();
            if now < self.next_emit {
                std::thread::sleep(self.next_emit - now);
            }
            self.next_emit = Instant::now() + self.interval;

            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
            self.pending = self.next_line().into_bytes();
        }

        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radwatch_core::time::FixedClock;
    use radwatch_core::TelemetryRecord;

    #[test]
    fn emits_parseable_lines() {
        let mut device = MockDevice::with_interval(Duration::ZERO).limited(3);
        let mut text = String::new();
        device.read_to_string(&mut text).unwrap();

        let clock = FixedClock::new(0);
        let records: Vec<TelemetryRecord> = text
            .lines()
            .map(|line| TelemetryRecord::parse(line, &clock).expect("mock line parses"))
            .collect();

        assert_eq!(records.len(), 3);

        // the index advances before formatting, so the ramp starts one step in
        let doses: Vec<f32> = records.iter().map(|r| r.dose()).collect();
        assert_eq!(doses, vec![0.10, 0.15, 0.20]);

        assert_eq!(records[0].position(), Some((52.2298, 21.0125)));
        assert_eq!(records[0].satellite_count(), 8);
        assert_eq!(records[0].date, "01.01.2024");
    }

    #[test]
    fn path_wraps_around() {
        let mut device = MockDevice::with_interval(Duration::ZERO).limited(7);
        let mut text = String::new();
        device.read_to_string(&mut text).unwrap();

        let clock = FixedClock::new(0);
        let first = TelemetryRecord::parse(text.lines().next().unwrap(), &clock).unwrap();
        let sixth = TelemetryRecord::parse(text.lines().nth(5).unwrap(), &clock).unwrap();

        // five path points: line 6 revisits line 1's position
        assert_eq!(first.position(), sixth.position());
    }

    #[test]
    fn honors_tiny_read_buffers() {
        let mut device = MockDevice::with_interval(Duration::ZERO).limited(1);
        let mut collected = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            match device.read(&mut byte).unwrap() {
                0 => break,
                n => collected.extend_from_slice(&byte[..n]),
            }
        }

        let text = String::from_utf8(collected).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.matches('|').count(), 9);
    }
}
