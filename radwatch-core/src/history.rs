//! Synchronized Dose Histories and Alarm Retention
//!
//! ## Overview
//!
//! The plotting surface of the pipeline is four parallel bounded series:
//! filtered dose, short-term rolling average, long-term (retained-window)
//! average, and timestamp. [`DoseHistory`] owns all four plus the sparse
//! alarm list, and is the only type allowed to mutate them, so the central
//! invariant has a single enforcement point:
//!
//! > After every append, the four buffers have identical length and index
//! > `i` in each refers to the same original sample.
//!
//! ## Append discipline
//!
//! [`DoseHistory::append`] performs the whole update as straight-line code
//! with no early return between the four pushes - a partial update cannot
//! occur by construction. Should the invariant ever be observed broken
//! anyway (a future refactor misstepping), [`DoseHistory::reconcile`] trims
//! every buffer down to the shortest current length instead of panicking;
//! the extra entries can only be newest ones, so trimming from the write
//! end keeps index correspondence of the intact prefix.
//!
//! ## Rolling averages
//!
//! Both aggregates are recomputed from scratch per append - O(window) scans
//! with windows in the tens and samples arriving every few seconds. The
//! "long-term" average is the mean over the *retained* window, not the whole
//! session: the buffer is capacity-bounded by design, and the approximation
//! is part of the observable contract (do not "fix" it to session-wide).
//!
//! ## Alarms
//!
//! A sample whose filtered dose exceeds the threshold is additionally
//! recorded as an [`AlarmEvent`]. Alarms are sparse (not parallel-indexed
//! with the main buffers) and keep their own cap of 2 × history capacity,
//! trimmed from the oldest end, so a long exceedance episode survives longer
//! than the plot window without growing without bound.

use crate::buffer::RingBuffer;
use crate::time::Timestamp;

/// Alarm retention cap as a multiple of the history capacity.
const ALARM_CAP_FACTOR: usize = 2;

/// One threshold exceedance: the filtered sample that crossed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlarmEvent {
    /// When the sample was taken, ms since epoch
    pub timestamp: Timestamp,
    /// Filtered dose that exceeded the threshold, μSv/h
    pub dose: f32,
}

/// Per-append results handed back to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppendOutcome {
    /// Short-term average including the sample just appended
    pub short_term: f32,
    /// Retained-window average including the sample just appended
    pub long_term: f32,
    /// Whether the sample exceeded the alarm threshold
    pub alarm: bool,
}

/// The four synchronized history buffers plus the alarm list.
#[derive(Debug, Clone)]
pub struct DoseHistory {
    filtered: RingBuffer<f32>,
    short_term: RingBuffer<f32>,
    long_term: RingBuffer<f32>,
    timestamps: RingBuffer<Timestamp>,
    alarms: Vec<AlarmEvent>,
    short_window: usize,
    alarm_threshold: f32,
    alarm_cap: usize,
}

impl DoseHistory {
    /// Creates empty histories.
    ///
    /// `capacity` is the plot depth N (clamped to at least 1),
    /// `short_window` the S of the short-term average, `alarm_threshold` the
    /// exceedance level in μSv/h.
    pub fn new(capacity: usize, short_window: usize, alarm_threshold: f32) -> Self {
        let capacity = capacity.max(1);
        Self {
            filtered: RingBuffer::new(capacity),
            short_term: RingBuffer::new(capacity),
            long_term: RingBuffer::new(capacity),
            timestamps: RingBuffer::new(capacity),
            alarms: Vec::new(),
            short_window: short_window.max(1),
            alarm_threshold,
            alarm_cap: capacity * ALARM_CAP_FACTOR,
        }
    }

    /// Appends one filtered sample, updating every series and the alarms.
    ///
    /// Push order: filtered first (both averages must include the new
    /// sample), then the two averages, then the timestamp. No fallible
    /// operation sits between the pushes.
    pub fn append(&mut self, timestamp: Timestamp, filtered: f32) -> AppendOutcome {
        self.filtered.push(filtered);

        let short_term = self.short_term_average();
        let long_term = self.long_term_average();

        self.short_term.push(short_term);
        self.long_term.push(long_term);
        self.timestamps.push(timestamp);

        let alarm = filtered > self.alarm_threshold;
        if alarm {
            self.alarms.push(AlarmEvent {
                timestamp,
                dose: filtered,
            });
            if self.alarms.len() > self.alarm_cap {
                let excess = self.alarms.len() - self.alarm_cap;
                self.alarms.drain(..excess);
            }
        }

        debug_assert!(self.is_synchronized());

        AppendOutcome {
            short_term,
            long_term,
            alarm,
        }
    }

    /// Mean of the most recent min(S, n) filtered samples; 0.0 when empty.
    pub fn short_term_average(&self) -> f32 {
        let n = self.filtered.len();
        if n == 0 {
            return 0.0;
        }

        let take = n.min(self.short_window);
        let sum: f32 = self.filtered.iter().skip(n - take).sum();
        sum / take as f32
    }

    /// Mean of all currently retained filtered samples; 0.0 when empty.
    pub fn long_term_average(&self) -> f32 {
        if self.filtered.is_empty() {
            return 0.0;
        }
        self.filtered.iter().sum::<f32>() / self.filtered.len() as f32
    }

    /// Whether the four buffers agree on length.
    pub fn is_synchronized(&self) -> bool {
        let n = self.filtered.len();
        self.short_term.len() == n && self.long_term.len() == n && self.timestamps.len() == n
    }

    /// Corrective pass: trims every buffer to the shortest current length.
    ///
    /// Returns the number of entries dropped across all buffers (0 when the
    /// invariant already held, which is the expected case).
    pub fn reconcile(&mut self) -> usize {
        let shortest = self
            .filtered
            .len()
            .min(self.short_term.len())
            .min(self.long_term.len())
            .min(self.timestamps.len());

        let before = self.filtered.len()
            + self.short_term.len()
            + self.long_term.len()
            + self.timestamps.len();

        self.filtered.truncate(shortest);
        self.short_term.truncate(shortest);
        self.long_term.truncate(shortest);
        self.timestamps.truncate(shortest);

        let dropped = before - 4 * shortest;
        if dropped > 0 {
            log::debug!("history reconciliation dropped {dropped} desynchronized entries");
        }
        dropped
    }

    /// Clears everything and reallocates to a (possibly new) capacity.
    pub fn reset(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        self.filtered = RingBuffer::new(capacity);
        self.short_term = RingBuffer::new(capacity);
        self.long_term = RingBuffer::new(capacity);
        self.timestamps = RingBuffer::new(capacity);
        self.alarms.clear();
        self.alarm_cap = capacity * ALARM_CAP_FACTOR;
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    /// Whether no samples are retained.
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    /// Filtered-dose series, oldest first.
    pub fn filtered(&self) -> &RingBuffer<f32> {
        &self.filtered
    }

    /// Short-term average series, oldest first.
    pub fn short_term(&self) -> &RingBuffer<f32> {
        &self.short_term
    }

    /// Long-term average series, oldest first.
    pub fn long_term(&self) -> &RingBuffer<f32> {
        &self.long_term
    }

    /// Timestamp series, oldest first.
    pub fn timestamps(&self) -> &RingBuffer<Timestamp> {
        &self.timestamps
    }

    /// Retained alarm events, oldest first.
    pub fn alarms(&self) -> &[AlarmEvent] {
        &self.alarms
    }

    /// Configured alarm threshold, μSv/h.
    pub fn alarm_threshold(&self) -> f32 {
        self.alarm_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn append_keeps_buffers_synchronized() {
        let mut history = DoseHistory::new(8, 4, 1.0);

        for i in 0..20 {
            history.append(i * 1000, 0.05 + i as f32 * 0.01);
            assert!(history.is_synchronized());
        }
        assert_eq!(history.len(), 8);
    }

    #[test]
    fn averages_match_definitions() {
        let mut history = DoseHistory::new(100, 3, 1.0);

        let outcome = history.append(0, 0.10);
        assert_close(outcome.short_term, 0.10);
        assert_close(outcome.long_term, 0.10);

        history.append(1000, 0.20);
        history.append(2000, 0.30);
        let outcome = history.append(3000, 0.40);

        // short window 3: mean(0.20, 0.30, 0.40)
        assert_close(outcome.short_term, 0.30);
        // all retained: mean(0.10, 0.20, 0.30, 0.40)
        assert_close(outcome.long_term, 0.25);
    }

    #[test]
    fn long_term_is_window_relative() {
        let mut history = DoseHistory::new(4, 2, 10.0);
        for i in 0..8 {
            history.append(i, i as f32);
        }

        // only 4.0..=7.0 are retained; earlier samples no longer contribute
        assert_close(history.long_term_average(), (4.0 + 5.0 + 6.0 + 7.0) / 4.0);
    }

    #[test]
    fn alarms_recorded_in_order_and_capped() {
        let mut history = DoseHistory::new(3, 2, 1.0);

        history.append(0, 0.5);
        history.append(1, 1.5);
        history.append(2, 0.9);
        history.append(3, 2.5);

        let doses: Vec<f32> = history.alarms().iter().map(|a| a.dose).collect();
        assert_eq!(doses, vec![1.5, 2.5]);

        // threshold is strict: exactly equal does not alarm
        history.append(4, 1.0);
        assert_eq!(history.alarms().len(), 2);

        // cap = 2 × capacity = 6, trimmed from the oldest end
        for i in 0..10 {
            history.append(100 + i, 5.0);
        }
        assert_eq!(history.alarms().len(), 6);
        assert_eq!(history.alarms()[0].timestamp, 104);
        assert_eq!(history.alarms()[5].timestamp, 109);
    }

    #[test]
    fn reconcile_trims_to_shortest() {
        let mut history = DoseHistory::new(8, 4, 1.0);
        for i in 0..5 {
            history.append(i, 0.1);
        }

        // force a desync the way a partial append would: one buffer ahead
        history.filtered.push(9.9);
        assert!(!history.is_synchronized());

        let dropped = history.reconcile();
        assert_eq!(dropped, 1);
        assert!(history.is_synchronized());
        assert_eq!(history.len(), 5);
        // the stray newest entry is gone, the prefix intact
        assert_close(history.filtered.last().unwrap(), 0.1);

        // reconcile on a healthy history is a no-op
        assert_eq!(history.reconcile(), 0);
    }

    #[test]
    fn reset_clears_and_reallocates() {
        let mut history = DoseHistory::new(4, 2, 0.5);
        for i in 0..6 {
            history.append(i, 1.0);
        }
        assert!(!history.is_empty());
        assert!(!history.alarms().is_empty());

        history.reset(10);

        assert!(history.is_empty());
        assert!(history.alarms().is_empty());
        assert_eq!(history.filtered().capacity(), 10);
        assert_close(history.short_term_average(), 0.0);
        assert_close(history.long_term_average(), 0.0);

        // behaves like a fresh history afterwards
        let outcome = history.append(0, 0.3);
        assert_close(outcome.short_term, 0.3);
        assert_eq!(history.len(), 1);
    }
}
