use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub pos: [f64; 3],
    pub vel: [f64; 3],
    pub acc: [f64; 3],
    pub mass: f64,
}

impl Particle {
    pub fn new(pos: [f64; 3], vel: [f64; 3], mass: f64) -> Self {
        Particle {
            pos,
            vel,
            acc: [0.0; 3],
            mass,
        }
    }
}

/// Owns the particle array for a run. Every initializer starts a fresh generator
/// from the same seed, so positions, velocities and masses are reproducible.
pub struct ParticleStore {
    particles: Vec<Particle>,
    seed: u64,
}

impl ParticleStore {
    pub fn new(count: usize, seed: u64) -> Self {
        ParticleStore {
            particles: vec![Particle::default(); count],
            seed,
        }
    }

    pub fn from_particles(particles: Vec<Particle>) -> Self {
        ParticleStore {
            particles,
            seed: crate::config::DEFAULT_SEED,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Runs all four initializers in order. `source` overrides positions axis by axis.
    pub fn initialize(&mut self, source: Option<&[f64]>) {
        self.initialize_positions(source);
        self.initialize_velocities();
        self.initialize_accelerations();
        self.initialize_masses();
    }

    /// Uniform [0, 1) per axis. Value `3 * i + k` of `source`, when present, replaces
    /// axis `k` of particle `i`; axes past the end of the source keep their draw.
    pub fn initialize_positions(&mut self, source: Option<&[f64]>) {
        let mut rng = fastrand::Rng::with_seed(self.seed);
        let mut overrides = source.unwrap_or(&[]).iter();
        for p in self.particles.iter_mut() {
            for k in 0..3 {
                p.pos[k] = rng.f64();
            }
            for k in 0..3 {
                if let Some(&v) = overrides.next() {
                    p.pos[k] = v;
                }
            }
        }
    }

    /// Uniform [-1, 1) per axis, scaled by 1e-3.
    pub fn initialize_velocities(&mut self) {
        let mut rng = fastrand::Rng::with_seed(self.seed);
        for p in self.particles.iter_mut() {
            for k in 0..3 {
                p.vel[k] = (rng.f64() * 2.0 - 1.0) * 1.0e-3;
            }
        }
    }

    pub fn initialize_accelerations(&mut self) {
        for p in self.particles.iter_mut() {
            p.acc = [0.0; 3];
        }
    }

    /// Uniform [0, 1) scaled by the particle count.
    pub fn initialize_masses(&mut self) {
        let n = self.particles.len() as f64;
        let mut rng = fastrand::Rng::with_seed(self.seed);
        for p in self.particles.iter_mut() {
            p.mass = n * rng.f64();
        }
    }
}

/// Reads whitespace-separated floats from `path`. Parsing stops at the first token
/// that is not a number. A file that cannot be read yields `None`.
pub fn read_seed_values(path: &Path) -> Option<Vec<f64>> {
    match fs::read_to_string(path) {
        Ok(text) => Some(parse_seed_values(&text)),
        Err(e) => {
            log::warn!(
                "could not open seed file {}: {}; using random positions",
                path.display(),
                e
            );
            None
        }
    }
}

pub fn parse_seed_values(text: &str) -> Vec<f64> {
    text.split_whitespace()
        .map_while(|tok| tok.parse::<f64>().ok())
        .collect()
}

#[cfg(test)]
pub(crate) fn two_bodies(distance: f64, mass: f64) -> Vec<Particle> {
    let half = distance / 2.0;
    vec![
        Particle::new([-half, 0.0, 0.0], [0.0; 3], mass),
        Particle::new([half, 0.0, 0.0], [0.0; 3], mass),
    ]
}
