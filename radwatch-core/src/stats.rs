//! Scalar Statistics and Redraw Rate Limiting
//!
//! Redrawing the time-series view is the expensive operation of the display
//! path; it is rate-limited to at most once per configured interval no
//! matter how fast the device emits lines. Between redraws only the cheap
//! scalar statistics are refreshed. Ingestion cadence and rendering cadence
//! are thereby decoupled: the device can stream at line rate while the UI
//! repaints a few times a minute.
//!
//! Statistics are recomputed with an O(window) scan over the current
//! filtered buffer on every request - no incremental min/max/mean state to
//! fall out of sync with the buffers after evictions.

use crate::history::DoseHistory;
use crate::time::Timestamp;

/// Scalar snapshot of the filtered-dose history.
///
/// The zero-state (`Default`) is what an empty history reports: all values
/// 0.0, count 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistoryStats {
    /// Minimum filtered dose in the retained window, μSv/h
    pub min: f32,
    /// Maximum filtered dose in the retained window, μSv/h
    pub max: f32,
    /// Mean filtered dose over the retained window, μSv/h
    pub mean: f32,
    /// Most recent short-term average, μSv/h
    pub short_term: f32,
    /// Number of retained samples
    pub count: usize,
}

impl HistoryStats {
    /// Computes a snapshot from the current history.
    pub fn compute(history: &DoseHistory) -> Self {
        if history.is_empty() {
            return Self::default();
        }

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0;
        for value in history.filtered().iter() {
            min = min.min(value);
            max = max.max(value);
            sum += value;
        }

        let count = history.len();
        Self {
            min,
            max,
            mean: sum / count as f32,
            short_term: history.short_term().last().unwrap_or(0.0),
            count,
        }
    }
}

/// Minimum-interval gate for expensive redraws.
///
/// `check` both queries and consumes: the first call at or past the
/// interval boundary returns `true` and restarts the interval. A fresh or
/// reset gate fires on the first check so a reconnect repaints immediately.
#[derive(Debug, Clone)]
pub struct RedrawGate {
    min_interval_ms: u64,
    last_redraw: Timestamp,
}

impl RedrawGate {
    /// Creates a gate that allows one redraw per `min_interval_ms`.
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_redraw: 0,
        }
    }

    /// Returns `true` when a redraw is due at `now`, claiming the slot.
    pub fn check(&mut self, now: Timestamp) -> bool {
        if now.saturating_sub(self.last_redraw) >= self.min_interval_ms {
            self.last_redraw = now;
            true
        } else {
            false
        }
    }

    /// Zeroes the gate; the next check fires regardless of elapsed time.
    pub fn reset(&mut self) {
        self.last_redraw = 0;
    }

    /// Configured minimum interval in milliseconds.
    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn empty_history_reports_zero_state() {
        let history = DoseHistory::new(10, 4, 1.0);
        let stats = HistoryStats::compute(&history);

        assert_eq!(stats, HistoryStats::default());
        assert_eq!(stats.count, 0);
        assert_close(stats.min, 0.0);
    }

    #[test]
    fn stats_cover_retained_window() {
        let mut history = DoseHistory::new(10, 2, 1.0);
        for (i, dose) in [0.05, 0.25, 0.15].iter().enumerate() {
            history.append(i as u64, *dose);
        }

        let stats = HistoryStats::compute(&history);
        assert_close(stats.min, 0.05);
        assert_close(stats.max, 0.25);
        assert_close(stats.mean, 0.15);
        assert_close(stats.short_term, 0.20); // mean of last 2
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn gate_limits_to_interval() {
        let mut gate = RedrawGate::new(3000);

        // fresh gate fires immediately
        assert!(gate.check(10_000));

        assert!(!gate.check(10_500));
        assert!(!gate.check(12_999));
        assert!(gate.check(13_000));
        assert!(!gate.check(13_001));
    }

    #[test]
    fn reset_rearms_the_gate() {
        let mut gate = RedrawGate::new(3000);
        assert!(gate.check(10_000));
        assert!(!gate.check(10_001));

        gate.reset();
        assert!(gate.check(10_002));
    }
}
