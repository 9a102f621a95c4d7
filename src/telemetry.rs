//! Bounded kernel-to-host conduit for per-particle acceleration extrema.
//!
//! Phase A pushes one [`TelemetrySample`] per particle from whichever worker
//! computed it; the step loop drains exactly that many once Phase B has joined.
//! The queue never holds more than one step's worth of samples.

use crossbeam_queue::ArrayQueue;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TelemetrySample {
    pub value: f64,
    pub flag: bool,
}

pub struct TelemetryChannel {
    queue: ArrayQueue<TelemetrySample>,
}

impl TelemetryChannel {
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        TelemetryChannel {
            queue: ArrayQueue::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Safe to call from many workers at once. Returns the sample back when full.
    pub fn write(&self, value: f64, flag: bool) -> Result<(), TelemetrySample> {
        self.queue.push(TelemetrySample { value, flag })
    }

    pub fn read(&self) -> Option<TelemetrySample> {
        self.queue.pop()
    }

    /// Pops up to `count` samples in FIFO order.
    pub fn drain(&self, count: usize) -> Vec<TelemetrySample> {
        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            match self.queue.pop() {
                Some(s) => out.push(s),
                None => break,
            }
        }
        out
    }
}
