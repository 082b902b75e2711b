//! Trailing Moving-Average Filter
//!
//! ## Overview
//!
//! Instantaneous dose readings from a Geiger tube are inherently noisy: the
//! underlying decay process is Poisson, so consecutive one-second readings
//! can easily differ by a factor of two at background rates. The first stage
//! of the pipeline therefore smooths every raw reading with a plain
//! trailing-window mean before anything else (classification, alarming,
//! history) sees it.
//!
//! The filter is a straight FIR mean over the last W samples - explicitly
//! *not* exponential and *not* weighted. Until W samples have been seen the
//! raw value passes through unsmoothed; there is no warm-up extrapolation.
//!
//! ```text
//! raw:      0.05  0.07  0.06  0.08  0.09  0.20 ...
//!            │     │     │     │     └──── mean(0.05..0.09) = 0.07
//!            └─────┴─────┴─────┴────────── passthrough (buffer < W)
//! ```
//!
//! Output is fully determined by the input sequence: replaying the same
//! readings through a fresh filter reproduces the same outputs bit for bit.

use crate::buffer::RingBuffer;

/// Trailing-window moving-average filter over raw dose readings.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    /// Window size W in samples
    window: usize,
    /// Raw trailing buffer, capacity exactly W
    raw: RingBuffer<f32>,
}

impl MovingAverage {
    /// Creates a filter with the given window size (clamped to at least 1).
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            raw: RingBuffer::new(window),
        }
    }

    /// Accepts one raw reading and returns the filtered value.
    ///
    /// The reading is pushed into the trailing buffer first, so a window of
    /// W covers the current reading plus the W−1 before it.
    pub fn apply(&mut self, raw_value: f32) -> f32 {
        self.raw.push(raw_value);

        if self.raw.is_full() {
            self.raw.iter().sum::<f32>() / self.window as f32
        } else {
            raw_value
        }
    }

    /// Window size W.
    pub fn window(&self) -> usize {
        self.window
    }

    /// The raw trailing buffer (most recent ≤ W readings).
    pub fn raw_window(&self) -> &RingBuffer<f32> {
        &self.raw
    }

    /// Clears the trailing buffer; the next W−1 readings pass through
    /// unsmoothed again.
    pub fn reset(&mut self) {
        self.raw.clear();
    }
}
