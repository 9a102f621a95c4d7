//! Step loop: runs the kernel, drains telemetry, samples throughput.

use std::time::Instant;

use crate::config::SimulationConfig;
use crate::error::{Result, SimError};
use crate::kernel::{gflops_per_step, StepKernel};
use crate::particle::{read_seed_values, Particle, ParticleStore};
use crate::quickstat::{StatisticsAccumulator, Summary};
use crate::report;
use crate::telemetry::{TelemetryChannel, TelemetrySample};

/// Timer resolution floor so a step can never report infinite throughput.
const MIN_STEP_SECONDS: f64 = 1e-9;

/// Largest and smallest acceleration seen across all particles and steps so far.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExtremumTracker {
    max: f64,
    min: f64,
}

impl ExtremumTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_sample(&mut self, sample: &TelemetrySample) {
        if sample.flag && sample.value > self.max {
            self.max = sample.value;
        }
    }

    pub fn observe_acceleration(&mut self, acc: &[f64; 3]) {
        for &a in acc {
            if a > self.max {
                self.max = a;
            }
            if a < self.min {
                self.min = a;
            }
        }
    }

    /// Folds the minimum's magnitude into the maximum.
    pub fn promote(&mut self) {
        if -self.min > self.max {
            self.max = -self.min;
        }
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn min(&self) -> f64 {
        self.min
    }
}

/// One reported step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepRecord {
    pub step: usize,
    pub time: f64,
    pub kinetic_energy: f64,
    pub seconds: f64,
    pub gflops: f64,
    /// Whether the throughput sample counted toward the statistics.
    pub accepted: bool,
}

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub particles: usize,
    pub steps: usize,
    pub dt: f64,
    pub records: Vec<StepRecord>,
    pub kinetic_energy: f64,
    pub total_seconds: f64,
    pub total_gflop: f64,
    pub throughput: Option<Summary>,
    pub worst_acceleration: f64,
    pub telemetry_samples: usize,
}

pub struct Simulation {
    config: SimulationConfig,
    store: ParticleStore,
    kernel: StepKernel,
    energy: f64,
    total_seconds: f64,
    total_gflop: f64,
    extrema: ExtremumTracker,
}

impl Simulation {
    /// Validates `config` and seeds the particles, reading positions from
    /// `config.input` when it can be read.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let source = config.input.as_deref().and_then(read_seed_values);
        let mut store = ParticleStore::new(config.particles, config.seed);
        store.initialize(source.as_deref());
        Ok(Self::from_store(config, store))
    }

    /// Uses `particles` as given; the configured particle count is replaced by
    /// their number.
    pub fn with_particles(mut config: SimulationConfig, particles: Vec<Particle>) -> Result<Self> {
        config.particles = particles.len();
        config.validate()?;
        Ok(Self::from_store(config, ParticleStore::from_particles(particles)))
    }

    fn from_store(config: SimulationConfig, store: ParticleStore) -> Self {
        Simulation {
            kernel: StepKernel::new(config.dt, config.policy),
            config,
            store,
            energy: 0.0,
            total_seconds: 0.0,
            total_gflop: 0.0,
            extrema: ExtremumTracker::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        self.store.particles()
    }

    pub fn extrema(&self) -> ExtremumTracker {
        self.extrema
    }

    pub fn run(&mut self) -> Result<RunSummary> {
        self.run_with(|_| {})
    }

    /// Runs every configured step, calling `on_report` for each reported one,
    /// and writes the worst-case acceleration to `config.output`.
    pub fn run_with<F>(&mut self, mut on_report: F) -> Result<RunSummary>
    where
        F: FnMut(&StepRecord),
    {
        let n = self.store.len();
        let steps = self.config.steps;
        let dt = self.config.dt;
        let sample_freq = self.config.sample_freq;
        let gflops = gflops_per_step(n);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()?;
        log::info!(
            "running {} particles for {} steps (dt = {}) on {} threads",
            n,
            steps,
            dt,
            pool.current_num_threads()
        );

        let channel = TelemetryChannel::new(n);
        let mut stats = StatisticsAccumulator::new();
        let mut records = Vec::new();
        let mut kinetic_energy = 0.0;
        let mut telemetry_samples = 0;
        let start = Instant::now();

        for s in 1..=steps {
            let step_start = Instant::now();
            let kernel = self.kernel;
            let particles = self.store.particles_mut();
            let energy = pool.install(|| -> Result<f64> {
                kernel.force_phase(s, particles, &channel)?;
                Ok(kernel.integrate_phase(particles))
            })?;
            self.energy += energy;

            kinetic_energy = 0.5 * self.energy;
            self.energy = 0.0;
            if !kinetic_energy.is_finite() {
                return Err(SimError::Numerical {
                    step: s,
                    message: format!("kinetic energy is {}", kinetic_energy),
                });
            }
            let seconds = step_start.elapsed().as_secs_f64().max(MIN_STEP_SECONDS);

            telemetry_samples += self.drain_telemetry(s, &channel)?;

            if s % sample_freq == 0 {
                let throughput = gflops / seconds;
                let record = StepRecord {
                    step: s,
                    time: s as f64 * dt,
                    kinetic_energy,
                    seconds,
                    gflops: throughput,
                    accepted: stats.offer(throughput),
                };
                on_report(&record);
                records.push(record);
            }
            log::debug!(
                "step {}: kenergy = {:e}, {:.6} s, worst |acc| = {:e}",
                s,
                kinetic_energy,
                seconds,
                self.extrema.max()
            );
        }

        self.total_seconds = start.elapsed().as_secs_f64();
        self.total_gflop = gflops * steps as f64;
        drop(channel);

        let worst = self.extrema.max();
        report::write_telemetry_file(&self.config.output, worst)?;
        log::info!(
            "finished in {:.6} s, worst |acc| = {:e} written to {}",
            self.total_seconds,
            worst,
            self.config.output.display()
        );

        Ok(RunSummary {
            particles: n,
            steps,
            dt,
            records,
            kinetic_energy,
            total_seconds: self.total_seconds,
            total_gflop: self.total_gflop,
            throughput: stats.summary(),
            worst_acceleration: worst,
            telemetry_samples,
        })
    }

    /// Reads exactly one sample per particle; anything else aborts the run.
    fn drain_telemetry(&mut self, step: usize, channel: &TelemetryChannel) -> Result<usize> {
        let n = self.store.len();
        let samples = channel.drain(n);
        if samples.len() != n {
            return Err(SimError::telemetry(
                step,
                format!("expected {} samples, drained {}", n, samples.len()),
            ));
        }
        if !channel.is_empty() {
            return Err(SimError::telemetry(
                step,
                format!("{} samples left after drain", channel.len()),
            ));
        }

        // Samples arrive in completion order, not particle order.
        for sample in &samples {
            self.extrema.observe_sample(sample);
        }
        for p in self.store.particles() {
            self.extrema.observe_acceleration(&p.acc);
        }
        self.extrema.promote();
        Ok(samples.len())
    }
}
