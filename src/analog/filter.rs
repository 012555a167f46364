//! # Moving-Average Filter
//!
//! Fixed-length moving average over a circular buffer, one instance per
//! analog channel. The buffer starts zero-filled, so the first N outputs
//! after boot carry a known warm-up bias toward zero.

/// Fixed-capacity circular moving average.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    buffer: Vec<u16>,
    index: usize,
}

impl MovingAverage {
    /// Creates a filter over `length` slots (at least 1).
    pub fn new(length: usize) -> Self {
        Self {
            buffer: vec![0; length.max(1)],
            index: 0,
        }
    }

    /// Stores one sample and returns the arithmetic mean of the buffer.
    ///
    /// The new sample overwrites the oldest slot, the write index wraps
    /// modulo the filter length, and the mean uses integer truncating
    /// division across all slots, zero-filled warm-up slots included.
    pub fn push(&mut self, sample: u16) -> u16 {
        self.buffer[self.index] = sample;
        self.index = (self.index + 1) % self.buffer.len();

        let sum: u32 = self.buffer.iter().map(|&v| u32::from(v)).sum();
        (sum / self.buffer.len() as u32) as u16
    }

    /// Filter length in slots.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always false; the buffer holds at least one slot.
    pub fn is_empty(&self) -> bool {
        false
    }
}
