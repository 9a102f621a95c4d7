/// Samples reported before statistics start being collected.
pub const WARMUP_SAMPLES: usize = 2;

/// Running mean and standard deviation over throughput samples, ignoring the
/// first [`WARMUP_SAMPLES`] offered.
#[derive(Clone, Debug, Default)]
pub struct StatisticsAccumulator {
    offered: usize,
    accepted: usize,
    sum: f64,
    sum_sqr: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub stddev: f64,
    pub samples: usize,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the sample made it past the warm-up window.
    pub fn offer(&mut self, sample: f64) -> bool {
        self.offered += 1;
        if self.offered <= WARMUP_SAMPLES {
            return false;
        }
        self.accepted += 1;
        self.sum += sample;
        self.sum_sqr += sample * sample;
        true
    }

    pub fn offered(&self) -> usize {
        self.offered
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// `None` until at least one sample has been accepted.
    pub fn summary(&self) -> Option<Summary> {
        if self.accepted == 0 {
            return None;
        }
        let n = self.accepted as f64;
        let mean = self.sum / n;
        // Rounding can push the variance of near-identical samples slightly negative.
        let variance = (self.sum_sqr / n - mean * mean).max(0.0);
        Some(Summary {
            mean,
            stddev: variance.sqrt(),
            samples: self.accepted,
        })
    }
}
