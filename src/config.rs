use std::path::PathBuf;

use crate::error::{Result, SimError};

pub const DEFAULT_PARTICLES: usize = 16000;
pub const DEFAULT_STEPS: usize = 10;
pub const DEFAULT_DT: f64 = 0.1;
pub const DEFAULT_SAMPLE_FREQ: usize = 1;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_OUTPUT: &str = "exec_fpga_info.txt";

/// What Phase A does with an axis whose pairwise displacement is exactly zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Zero the whole accumulator for that axis. Since `j == i` always has zero
    /// displacement, every contribution from `j < i` is discarded.
    #[default]
    ResetAccumulator,
    /// Leave the accumulator alone and skip only that pair's contribution.
    SkipPair,
}

#[derive(Clone, Debug)]
pub struct SimulationConfig {
    pub particles: usize,
    pub steps: usize,
    pub dt: f64,
    /// Every `sample_freq`-th step is reported and sampled for throughput.
    pub sample_freq: usize,
    /// Optional whitespace-separated position triples overriding random seeding.
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub threads: usize,
    pub policy: DegeneratePolicy,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            particles: DEFAULT_PARTICLES,
            steps: DEFAULT_STEPS,
            dt: DEFAULT_DT,
            sample_freq: DEFAULT_SAMPLE_FREQ,
            input: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            threads: num_cpus::get(),
            policy: DegeneratePolicy::default(),
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.particles == 0 {
            return Err(SimError::config("particle count must be positive"));
        }
        if self.steps == 0 {
            return Err(SimError::config("step count must be positive"));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::config(format!(
                "time step must be positive and finite, got {}",
                self.dt
            )));
        }
        if self.sample_freq == 0 {
            return Err(SimError::config("sample frequency must be positive"));
        }
        if self.threads == 0 {
            return Err(SimError::config("thread count must be positive"));
        }
        Ok(())
    }
}
