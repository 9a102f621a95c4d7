//! The two-phase per-step kernel.
//!
//! Phase A evaluates the direct O(N^2) gravitational sum for every particle in
//! parallel, kicks velocities and emits one telemetry sample per particle.
//! Phase B drifts positions and reduces kinetic energy. Both phases return only
//! after every work item has finished, which is the barrier between them.

use rayon::prelude::*;

use crate::config::DegeneratePolicy;
use crate::error::{Result, SimError};
use crate::particle::Particle;
use crate::telemetry::TelemetryChannel;

/// Added to every squared distance so coincident particles stay finite.
pub const SOFTENING_SQUARED: f64 = 1e-14;
pub const G: f64 = 6.67259e-11;

/// Analytical work of one step in GFLOP: 29 flops per pair plus 19 per particle.
pub fn gflops_per_step(n: usize) -> f64 {
    let n = n as f64;
    1e-9 * ((11.0 + 18.0) * n * n + n * 19.0)
}

#[derive(Clone, Copy, Debug)]
pub struct StepKernel {
    pub dt: f64,
    pub policy: DegeneratePolicy,
}

impl StepKernel {
    pub fn new(dt: f64, policy: DegeneratePolicy) -> Self {
        StepKernel { dt, policy }
    }

    /// Acceleration on particle `i` and the largest magnitude any of its three
    /// components reached while the sum was being built.
    pub fn accelerate(&self, i: usize, particles: &[Particle]) -> ([f64; 3], f64) {
        let pi = particles[i].pos;
        let mut acc = [0.0; 3];
        let mut acc_max: f64 = 0.0;
        let mut acc_min: f64 = 0.0;

        for pj in particles {
            let d = [pj.pos[0] - pi[0], pj.pos[1] - pi[1], pj.pos[2] - pi[2]];
            let dist_sqr = d[0] * d[0] + d[1] * d[1] + d[2] * d[2] + SOFTENING_SQUARED;
            let dist_inv = 1.0 / dist_sqr.sqrt();
            let scale = G * pj.mass * dist_inv * dist_inv * dist_inv;

            for k in 0..3 {
                if d[k] == 0.0 {
                    if self.policy == DegeneratePolicy::ResetAccumulator {
                        acc[k] = 0.0;
                    }
                } else {
                    acc[k] += d[k] * scale;
                }
            }

            for &a in &acc {
                acc_max = acc_max.max(a);
                acc_min = acc_min.min(a);
            }
        }

        (acc, acc_max.max(-acc_min))
    }

    /// Phase A. Forces are computed from a shared view of the step's starting
    /// positions, then accelerations and velocities are committed in a second
    /// parallel pass, so no work item observes another's writes.
    pub fn force_phase(
        &self,
        step: usize,
        particles: &mut [Particle],
        channel: &TelemetryChannel,
    ) -> Result<()> {
        let view: &[Particle] = particles;
        let accels: Vec<[f64; 3]> = (0..view.len())
            .into_par_iter()
            .map(|i| {
                let (acc, peak) = self.accelerate(i, view);
                channel.write(peak, true).map_err(|_| {
                    SimError::telemetry(
                        step,
                        format!("channel full at capacity {}", channel.capacity()),
                    )
                })?;
                Ok(acc)
            })
            .collect::<Result<Vec<_>>>()?;

        let dt = self.dt;
        particles
            .par_iter_mut()
            .zip(accels.par_iter())
            .for_each(|(p, a)| {
                p.acc = *a;
                for k in 0..3 {
                    p.vel[k] += a[k] * dt;
                }
            });
        Ok(())
    }

    /// Phase B. Returns the unhalved sum of `m * |v|^2` over all particles.
    pub fn integrate_phase(&self, particles: &mut [Particle]) -> f64 {
        let dt = self.dt;
        particles
            .par_iter_mut()
            .map(|p| {
                for k in 0..3 {
                    p.pos[k] += p.vel[k] * dt;
                }
                p.mass * (p.vel[0] * p.vel[0] + p.vel[1] * p.vel[1] + p.vel[2] * p.vel[2])
            })
            .sum::<f64>()
    }
}
